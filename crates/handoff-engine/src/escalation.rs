// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation state machine: `none → pending → in_progress → resolved`.
//!
//! `resolved` ends an escalation episode; this core never re-escalates a
//! conversation (a second episode would be a higher-level concern). The
//! `pending → in_progress` edge lives in the ledger as the first-reply side
//! effect; this module owns the entry edge and the explicit status updates.

use std::str::FromStr;

use tracing::info;

use handoff_core::{Conversation, ConversationStore, HandoffError, SupportStatus};

/// Escalate a conversation to human support.
///
/// Sets `requires_human_support`, `human_support_status = pending`,
/// `escalated_at = now` (store-assigned), and the optional reason, all in
/// one atomic store operation. Escalating an already-escalated conversation
/// is a no-op that returns the current row, so `escalated_at` stays the
/// timestamp of the first episode. Fails with [`HandoffError::NotFound`]
/// when the conversation does not resolve.
pub async fn escalate(
    store: &dyn ConversationStore,
    conversation_id: &str,
    reason: Option<&str>,
) -> Result<Conversation, HandoffError> {
    let conversation = store
        .mark_escalated(conversation_id, reason)
        .await?
        .ok_or_else(|| HandoffError::NotFound {
            entity: "conversation",
            id: conversation_id.to_string(),
        })?;
    info!(
        conversation_id = %conversation.id,
        tenant_id = %conversation.tenant_id,
        reason = reason.unwrap_or("none given"),
        "conversation escalated to human support"
    );
    Ok(conversation)
}

/// Explicitly set a conversation's support status.
///
/// Accepts `pending`, `in_progress`, or `resolved`; anything else,
/// including `none`, fails with [`HandoffError::Validation`] before the
/// store is touched. Only `human_support_status` changes. Backward moves
/// like `resolved → pending` are allowed: operators reopen conversations,
/// and the protocol trusts them to drive their own workflow.
pub async fn set_status(
    store: &dyn ConversationStore,
    conversation_id: &str,
    status: &str,
) -> Result<Conversation, HandoffError> {
    let parsed = SupportStatus::from_str(status).ok().filter(|s| *s != SupportStatus::None);
    let parsed = parsed.ok_or_else(|| {
        HandoffError::Validation(format!(
            "status must be one of pending, in_progress, resolved (got {status:?})"
        ))
    })?;

    let updated = store
        .update_support_status(conversation_id, parsed)
        .await?;
    if !updated {
        return Err(HandoffError::NotFound {
            entity: "conversation",
            id: conversation_id.to_string(),
        });
    }
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| HandoffError::NotFound {
            entity: "conversation",
            id: conversation_id.to_string(),
        })?;
    if parsed == SupportStatus::Resolved {
        info!(conversation_id = %conversation.id, "escalation resolved");
    }
    Ok(conversation)
}
