// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message ledger and cursor reads.
//!
//! The ledger is the source of truth for polling. Appends never mutate or
//! delete earlier rows, and every read orders by the composite
//! `(created_at, id)` key, so two messages sharing a millisecond still have
//! one total order.
//!
//! A human agent's first reply doubles as the pickup signal: appending a
//! `human_agent` message to a `pending` conversation advances it to
//! `in_progress` in the same call. Requiring a separate status call would
//! let a reply land without the queue ever learning someone took the
//! conversation.

use serde::Serialize;
use tracing::{debug, warn};

use handoff_core::{
    ConversationStore, HandoffError, Message, MessageCursor, MessageDraft, SenderType,
    SupportStatus,
};

/// What happened to `human_support_status` as a side effect of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTransition {
    /// The conversation moved `pending → in_progress`.
    Advanced,
    /// No transition applied (wrong sender type, wrong state, or a
    /// concurrent caller already advanced it).
    Unchanged,
    /// The transition was attempted and the store refused; the message
    /// itself is persisted. Logged, never propagated.
    Failed,
}

/// Result of an append: the stored message plus the status side effect,
/// reported separately so callers that care about partial failure can see
/// it while everyone else reads `.message`.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub message: Message,
    pub status_transition: StatusTransition,
}

/// Append a message to a conversation's ledger.
///
/// Content is trimmed; blank content and an unresolvable conversation are
/// both caller errors on the open widget surface and fail with
/// [`HandoffError::Validation`]. The store assigns `id` and `created_at`,
/// and `sender` is derived from `sender_type`.
///
/// When `sender_type` is [`SenderType::HumanAgent`] and the conversation is
/// `pending`, the call also performs the first-reply transition to
/// `in_progress`. That transition is best-effort: the append has already
/// succeeded, so a store failure here downgrades to
/// [`StatusTransition::Failed`] with a WARN instead of an error.
pub async fn append(
    store: &dyn ConversationStore,
    conversation_id: &str,
    sender_type: SenderType,
    content: &str,
    agent_name: Option<&str>,
) -> Result<AppendOutcome, HandoffError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(HandoffError::Validation(
            "message content must not be empty".to_string(),
        ));
    }
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| {
            HandoffError::Validation(format!("unknown conversation: {conversation_id}"))
        })?;

    let message = store
        .insert_message(&MessageDraft {
            conversation_id: conversation_id.to_string(),
            sender_type,
            content: content.to_string(),
            agent_name: agent_name.map(|s| s.to_string()),
        })
        .await?;

    let status_transition = if sender_type == SenderType::HumanAgent
        && conversation.human_support_status == SupportStatus::Pending
    {
        match store.advance_pending_to_in_progress(conversation_id).await {
            Ok(true) => {
                debug!(conversation_id = %conversation_id, "first human reply, conversation now in_progress");
                StatusTransition::Advanced
            }
            Ok(false) => StatusTransition::Unchanged,
            Err(e) => {
                warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "status transition failed (non-fatal), reply is persisted"
                );
                StatusTransition::Failed
            }
        }
    } else {
        StatusTransition::Unchanged
    };

    Ok(AppendOutcome {
        message,
        status_transition,
    })
}

/// All messages of a conversation strictly after `after_message_id`,
/// ascending by `(created_at, id)`. With no cursor the full ledger comes
/// back.
///
/// A cursor that does not resolve, or that belongs to another conversation,
/// is silently skipped and the full list returned. A stale cursor must not
/// break the widget's poll loop.
pub async fn list_since(
    store: &dyn ConversationStore,
    conversation_id: &str,
    after_message_id: Option<&str>,
) -> Result<Vec<Message>, HandoffError> {
    let cursor = match after_message_id {
        Some(id) => store
            .get_message(id)
            .await?
            .filter(|m| m.conversation_id == conversation_id)
            .map(|m| MessageCursor::from(&m)),
        None => None,
    };
    store.messages_after(conversation_id, cursor.as_ref()).await
}
