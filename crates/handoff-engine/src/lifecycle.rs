// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation open and close, the edges of the widget's lifecycle.

use tracing::info;

use handoff_core::{Conversation, ConversationStore, HandoffError};

/// Open a conversation for a visitor on a tenant's page.
///
/// Fails with [`HandoffError::Validation`] on blank ids and
/// [`HandoffError::NotFound`] for an unknown tenant. The new conversation
/// starts un-escalated with status `none`.
pub async fn start_conversation(
    store: &dyn ConversationStore,
    tenant_id: &str,
    visitor_id: &str,
    page_url: Option<&str>,
) -> Result<Conversation, HandoffError> {
    if tenant_id.trim().is_empty() {
        return Err(HandoffError::Validation(
            "tenant id must not be empty".to_string(),
        ));
    }
    if visitor_id.trim().is_empty() {
        return Err(HandoffError::Validation(
            "visitor id must not be empty".to_string(),
        ));
    }
    store
        .get_tenant(tenant_id)
        .await?
        .ok_or_else(|| HandoffError::NotFound {
            entity: "tenant",
            id: tenant_id.to_string(),
        })?;
    let conversation = store
        .insert_conversation(tenant_id, visitor_id, page_url)
        .await?;
    info!(
        conversation_id = %conversation.id,
        tenant_id = %tenant_id,
        "conversation opened"
    );
    Ok(conversation)
}

/// Record the widget-closed signal.
///
/// Sets `ended_at` the first time; later calls return the row unchanged.
/// Ending a conversation does not touch its escalation state, so an
/// operator can still resolve a thread the visitor walked away from.
pub async fn end_conversation(
    store: &dyn ConversationStore,
    conversation_id: &str,
) -> Result<Conversation, HandoffError> {
    let conversation = store
        .mark_ended(conversation_id)
        .await?
        .ok_or_else(|| HandoffError::NotFound {
            entity: "conversation",
            id: conversation_id.to_string(),
        })?;
    info!(conversation_id = %conversation.id, "conversation ended");
    Ok(conversation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::SupportStatus;
    use handoff_test_utils::MemStore;

    async fn store_with_tenant() -> MemStore {
        let store = MemStore::new();
        store.insert_tenant("acme", "Acme Corp").await.unwrap();
        store
    }

    #[tokio::test]
    async fn start_creates_an_unescalated_conversation() {
        let store = store_with_tenant().await;

        let conv = start_conversation(
            &store,
            "acme",
            "visitor-1",
            Some("https://acme.example/pricing"),
        )
        .await
        .unwrap();
        assert_eq!(conv.tenant_id, "acme");
        assert_eq!(conv.page_url.as_deref(), Some("https://acme.example/pricing"));
        assert!(!conv.requires_human_support);
        assert_eq!(conv.human_support_status, SupportStatus::None);
        assert!(conv.ended_at.is_none());
    }

    #[tokio::test]
    async fn start_rejects_blank_ids() {
        let store = store_with_tenant().await;

        let err = start_conversation(&store, " ", "visitor-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::Validation(_)));

        let err = start_conversation(&store, "acme", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::Validation(_)));
    }

    #[tokio::test]
    async fn start_requires_a_known_tenant() {
        let store = MemStore::new();
        let err = start_conversation(&store, "ghost", "visitor-1", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HandoffError::NotFound { entity: "tenant", .. }
        ));
    }

    #[tokio::test]
    async fn end_is_idempotent() {
        let store = store_with_tenant().await;
        let conv = start_conversation(&store, "acme", "visitor-1", None)
            .await
            .unwrap();

        let first = end_conversation(&store, &conv.id).await.unwrap();
        assert!(first.ended_at.is_some());

        let second = end_conversation(&store, &conv.id).await.unwrap();
        assert_eq!(second.ended_at, first.ended_at);
    }

    #[tokio::test]
    async fn end_missing_conversation_is_not_found() {
        let store = MemStore::new();
        let err = end_conversation(&store, "no-such-conv").await.unwrap_err();
        assert!(matches!(err, HandoffError::NotFound { .. }));
    }
}
