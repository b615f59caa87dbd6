// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply gateway: a human agent's answer into the ledger.
//!
//! A reply is one operation with an explicit sub-step, not two independent
//! calls: (1) append the message with `sender = bot`, `sender_type =
//! human_agent`; (2) best-effort advance of `pending → in_progress`. The
//! receipt reports the two outcomes separately so a caller that cares can
//! observe partial failure; the default caller just reads the message.

use serde::Serialize;

use handoff_core::{ConversationStore, HandoffError, Message, SenderType};

use crate::ledger::{self, StatusTransition};

/// Receipt for a delivered reply.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyReceipt {
    pub message: Message,
    pub status_transition: StatusTransition,
}

/// Append a human agent's reply to a conversation.
///
/// Fails with [`HandoffError::Validation`] on a blank conversation id or
/// blank content, and inherits the ledger's taxonomy for an unresolvable
/// conversation. The message is recorded with `sender = bot` so the
/// widget's rendering path treats it like any automated reply, while
/// `sender_type = human_agent` keeps the audit trail distinguishable.
///
/// A failed status transition never fails the call; the visitor must see
/// the reply even if the queue's bookkeeping lags
/// ([`StatusTransition::Failed`] in the receipt, WARN in the log).
pub async fn reply(
    store: &dyn ConversationStore,
    conversation_id: &str,
    content: &str,
    agent_name: Option<&str>,
) -> Result<ReplyReceipt, HandoffError> {
    if conversation_id.trim().is_empty() {
        return Err(HandoffError::Validation(
            "conversation id must not be empty".to_string(),
        ));
    }
    let outcome = ledger::append(
        store,
        conversation_id,
        SenderType::HumanAgent,
        content,
        agent_name,
    )
    .await?;
    Ok(ReplyReceipt {
        message: outcome.message,
        status_transition: outcome.status_transition,
    })
}
