// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless poll cursor protocol for the disconnected widget.
//!
//! The client holds all poll state: it sends the id of the last message it
//! rendered and receives the strict suffix plus the conversation's live
//! escalation flags. No server-side cursor exists, so restarts and
//! load-balanced handlers are invisible to the client, and an abandoned
//! poll has no side effect.

use serde::Serialize;
use tracing::debug;

use handoff_core::{ConversationStore, HandoffError, Message, SupportStatus};

use crate::ledger;

/// One poll cycle's answer: new messages plus the conversation's current
/// escalation flags. The flags are read at poll time independent of the
/// message filter, so a poll returning zero messages still reveals a status
/// change (say, a resolution).
#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub messages: Vec<Message>,
    pub is_escalated: bool,
    pub support_status: SupportStatus,
}

/// Answer one poll request.
///
/// Fails with [`HandoffError::NotFound`] when the conversation does not
/// resolve. An unresolvable cursor falls back to a full replay (see
/// [`ledger::list_since`]); repeated polls with the same cursor and no
/// intervening writes return identical responses.
pub async fn poll(
    store: &dyn ConversationStore,
    conversation_id: &str,
    after_message_id: Option<&str>,
) -> Result<PollResponse, HandoffError> {
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| HandoffError::NotFound {
            entity: "conversation",
            id: conversation_id.to_string(),
        })?;
    let messages = ledger::list_since(store, conversation_id, after_message_id).await?;
    debug!(
        conversation_id = %conversation_id,
        new_messages = messages.len(),
        status = %conversation.human_support_status,
        "poll served"
    );
    Ok(PollResponse {
        messages,
        is_escalated: conversation.requires_human_support,
        support_status: conversation.human_support_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation;
    use handoff_core::SenderType;
    use handoff_test_utils::MemStore;

    async fn store_with_conversation() -> (MemStore, String) {
        let store = MemStore::new();
        store.insert_tenant("acme", "Acme Corp").await.unwrap();
        let conv = store
            .insert_conversation("acme", "visitor-1", None)
            .await
            .unwrap();
        let id = conv.id;
        (store, id)
    }

    async fn say(store: &MemStore, conv_id: &str, content: &str) -> Message {
        ledger::append(store, conv_id, SenderType::Visitor, content, None)
            .await
            .unwrap()
            .message
    }

    #[tokio::test]
    async fn initial_poll_returns_everything_and_flags() {
        let (store, conv_id) = store_with_conversation().await;
        say(&store, &conv_id, "anyone there?").await;

        let response = poll(&store, &conv_id, None).await.unwrap();
        assert_eq!(response.messages.len(), 1);
        assert!(!response.is_escalated);
        assert_eq!(response.support_status, SupportStatus::None);
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found() {
        let store = MemStore::new();
        let err = poll(&store, "no-such-conv", None).await.unwrap_err();
        assert!(matches!(err, HandoffError::NotFound { .. }));
    }

    #[tokio::test]
    async fn cursor_poll_returns_only_newer_messages() {
        let (store, conv_id) = store_with_conversation().await;
        let seen = say(&store, &conv_id, "first").await;
        say(&store, &conv_id, "second").await;

        let response = poll(&store, &conv_id, Some(&seen.id)).await.unwrap();
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].content, "second");
    }

    #[tokio::test]
    async fn empty_poll_still_reveals_a_status_change() {
        let (store, conv_id) = store_with_conversation().await;
        let last = say(&store, &conv_id, "thanks, bye").await;
        escalation::escalate(&store, &conv_id, None).await.unwrap();
        escalation::set_status(&store, &conv_id, "resolved")
            .await
            .unwrap();

        let response = poll(&store, &conv_id, Some(&last.id)).await.unwrap();
        assert!(response.messages.is_empty());
        assert!(response.is_escalated);
        assert_eq!(response.support_status, SupportStatus::Resolved);
    }

    #[tokio::test]
    async fn repeated_polls_with_same_cursor_are_stable() {
        let (store, conv_id) = store_with_conversation().await;
        let seen = say(&store, &conv_id, "first").await;
        say(&store, &conv_id, "second").await;

        let a = poll(&store, &conv_id, Some(&seen.id)).await.unwrap();
        let b = poll(&store, &conv_id, Some(&seen.id)).await.unwrap();
        assert_eq!(a.messages, b.messages);
        assert_eq!(a.support_status, b.support_status);
    }

    #[tokio::test]
    async fn poll_response_serializes_snake_case() {
        let (store, conv_id) = store_with_conversation().await;
        escalation::escalate(&store, &conv_id, None).await.unwrap();

        let response = poll(&store, &conv_id, None).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["is_escalated"], serde_json::json!(true));
        assert_eq!(json["support_status"], serde_json::json!("pending"));
        assert!(json["messages"].as_array().unwrap().is_empty());
    }
}
