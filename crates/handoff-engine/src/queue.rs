// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation queue view for the operator console.
//!
//! A pure read-time projection over the store, recomputed per call. Keeping
//! it query-shaped instead of cached means horizontally scaled instances
//! and restarts can never disagree about the queue.

use std::str::FromStr;

use serde::Serialize;

use handoff_core::{Conversation, ConversationStore, EscalationRow, HandoffError, SupportStatus};

/// Upper bound on queue rows per call.
pub const QUEUE_PAGE_SIZE: u32 = 100;

/// Preview length in characters, before the ellipsis.
const PREVIEW_MAX_CHARS: usize = 100;

/// One operator-console row: the conversation plus everything needed to
/// triage it without opening the thread.
#[derive(Debug, Clone, Serialize)]
pub struct EscalationEntry {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub tenant_name: String,
    pub message_count: u64,
    /// Most recent visitor-authored message, truncated. The visitor's ask,
    /// not the agent's own last answer, is what triage needs to see.
    pub preview: Option<String>,
    /// Nobody has picked this up yet (`status == pending`).
    pub unread: bool,
}

fn truncate_preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &content[..cut]),
        None => content.to_string(),
    }
}

impl From<EscalationRow> for EscalationEntry {
    fn from(row: EscalationRow) -> Self {
        let unread = row.conversation.human_support_status == SupportStatus::Pending;
        EscalationEntry {
            unread,
            tenant_name: row.tenant_name,
            message_count: row.message_count,
            preview: row.last_visitor_message.as_deref().map(truncate_preview),
            conversation: row.conversation,
        }
    }
}

/// Escalated conversations across all tenants, newest escalation first,
/// capped at [`QUEUE_PAGE_SIZE`].
///
/// `status_filter` narrows to one parsed status; an unrecognized filter
/// string fails with [`HandoffError::Validation`]. Only rows with
/// `requires_human_support` set are ever returned.
pub async fn list_escalations(
    store: &dyn ConversationStore,
    status_filter: Option<&str>,
) -> Result<Vec<EscalationEntry>, HandoffError> {
    let status = match status_filter {
        Some(raw) => Some(SupportStatus::from_str(raw).map_err(|_| {
            HandoffError::Validation(format!("unrecognized status filter: {raw:?}"))
        })?),
        None => None,
    };
    let rows = store.escalated(status, QUEUE_PAGE_SIZE).await?;
    Ok(rows.into_iter().map(EscalationEntry::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{escalation, ledger};
    use handoff_core::SenderType;
    use handoff_test_utils::MemStore;

    async fn store_with_tenant() -> MemStore {
        let store = MemStore::new();
        store.insert_tenant("acme", "Acme Corp").await.unwrap();
        store
    }

    async fn escalated_conversation(store: &MemStore, visitor: &str) -> String {
        let conv = store
            .insert_conversation("acme", visitor, None)
            .await
            .unwrap();
        escalation::escalate(store, &conv.id, None).await.unwrap();
        conv.id
    }

    #[tokio::test]
    async fn queue_shows_pending_entries_as_unread() {
        let store = store_with_tenant().await;
        let conv_id = escalated_conversation(&store, "visitor-1").await;
        ledger::append(&store, &conv_id, SenderType::Visitor, "I need a refund", None)
            .await
            .unwrap();

        let entries = list_escalations(&store, Some("pending")).await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.tenant_name, "Acme Corp");
        assert_eq!(entry.message_count, 1);
        assert_eq!(entry.preview.as_deref(), Some("I need a refund"));
        assert!(entry.unread);
    }

    #[tokio::test]
    async fn claimed_entries_are_read() {
        let store = store_with_tenant().await;
        let conv_id = escalated_conversation(&store, "visitor-1").await;
        ledger::append(&store, &conv_id, SenderType::HumanAgent, "on it", None)
            .await
            .unwrap();

        let entries = list_escalations(&store, None).await.unwrap();
        assert!(!entries[0].unread);
    }

    #[tokio::test]
    async fn preview_tracks_the_visitor_not_the_agent() {
        let store = store_with_tenant().await;
        let conv_id = escalated_conversation(&store, "visitor-1").await;
        ledger::append(&store, &conv_id, SenderType::Visitor, "my card was charged twice", None)
            .await
            .unwrap();
        ledger::append(&store, &conv_id, SenderType::HumanAgent, "looking into it now", None)
            .await
            .unwrap();

        let entries = list_escalations(&store, None).await.unwrap();
        assert_eq!(
            entries[0].preview.as_deref(),
            Some("my card was charged twice")
        );
    }

    #[tokio::test]
    async fn long_previews_are_cut_on_a_char_boundary() {
        let store = store_with_tenant().await;
        let conv_id = escalated_conversation(&store, "visitor-1").await;

        // 120 two-byte chars; a byte-offset cut would split one in half.
        let long: String = "é".repeat(120);
        ledger::append(&store, &conv_id, SenderType::Visitor, &long, None)
            .await
            .unwrap();

        let entries = list_escalations(&store, None).await.unwrap();
        let preview = entries[0].preview.as_deref().unwrap();
        assert_eq!(preview.chars().count(), 101);
        assert!(preview.ends_with('…'));
        assert!(preview.starts_with("éé"));
    }

    #[tokio::test]
    async fn exactly_page_length_previews_are_untouched() {
        let store = store_with_tenant().await;
        let conv_id = escalated_conversation(&store, "visitor-1").await;
        let exact: String = "x".repeat(100);
        ledger::append(&store, &conv_id, SenderType::Visitor, &exact, None)
            .await
            .unwrap();

        let entries = list_escalations(&store, None).await.unwrap();
        assert_eq!(entries[0].preview.as_deref(), Some(exact.as_str()));
    }

    #[tokio::test]
    async fn unescalated_conversations_never_appear() {
        let store = store_with_tenant().await;
        let quiet = store
            .insert_conversation("acme", "visitor-quiet", None)
            .await
            .unwrap();
        ledger::append(&store, &quiet.id, SenderType::Visitor, "all good", None)
            .await
            .unwrap();
        // The permissive status setter can stamp a status onto a
        // conversation that was never escalated; the queue keys on the
        // escalation flag and must not pick it up.
        escalation::set_status(&store, &quiet.id, "pending").await.unwrap();
        escalated_conversation(&store, "visitor-loud").await;

        for filter in [None, Some("pending")] {
            let entries = list_escalations(&store, filter).await.unwrap();
            assert_eq!(entries.len(), 1);
            assert!(entries.iter().all(|e| e.conversation.requires_human_support));
        }
    }

    #[tokio::test]
    async fn bogus_filter_is_a_validation_error() {
        let store = store_with_tenant().await;
        let err = list_escalations(&store, Some("urgent")).await.unwrap_err();
        assert!(matches!(err, HandoffError::Validation(_)));
    }

    #[tokio::test]
    async fn filter_narrows_by_status() {
        let store = store_with_tenant().await;
        escalated_conversation(&store, "visitor-waiting").await;
        let claimed = escalated_conversation(&store, "visitor-claimed").await;
        escalation::set_status(&store, &claimed, "in_progress")
            .await
            .unwrap();

        let pending = list_escalations(&store, Some("pending")).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].conversation.visitor_id, "visitor-waiting");

        let in_progress = list_escalations(&store, Some("in_progress")).await.unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].conversation.visitor_id, "visitor-claimed");
    }

    #[tokio::test]
    async fn newest_escalation_first_and_capped() {
        let store = store_with_tenant().await;
        for i in 0..3 {
            escalated_conversation(&store, &format!("visitor-{i}")).await;
        }

        let entries = list_escalations(&store, None).await.unwrap();
        let visitors: Vec<&str> = entries
            .iter()
            .map(|e| e.conversation.visitor_id.as_str())
            .collect();
        assert_eq!(visitors, vec!["visitor-2", "visitor-1", "visitor-0"]);
        assert!(entries.len() <= QUEUE_PAGE_SIZE as usize);
    }

    #[tokio::test]
    async fn entry_serializes_flat_with_projection_fields() {
        let store = store_with_tenant().await;
        let conv_id = escalated_conversation(&store, "visitor-1").await;
        ledger::append(&store, &conv_id, SenderType::Visitor, "hello", None)
            .await
            .unwrap();

        let entries = list_escalations(&store, None).await.unwrap();
        let json = serde_json::to_value(&entries[0]).unwrap();
        // Conversation fields are flattened next to the projection's own.
        assert_eq!(json["id"], serde_json::json!(conv_id));
        assert_eq!(json["tenant_name"], serde_json::json!("Acme Corp"));
        assert_eq!(json["unread"], serde_json::json!(true));
        assert_eq!(json["preview"], serde_json::json!("hello"));
    }
}
