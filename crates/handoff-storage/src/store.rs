// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ConversationStore`] backed by SQLite.

use async_trait::async_trait;
use handoff_config::StorageConfig;
use handoff_core::{
    Conversation, ConversationStore, EscalationRow, HandoffError, Message, MessageCursor,
    MessageDraft, SupportStatus, Tenant,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store. All writes funnel through one connection, so the
/// store-assigned timestamps come from a single clock.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open (creating if needed) the database at the configured path and run
    /// pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, HandoffError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        Ok(SqliteStore { db })
    }

    /// Checkpoint and release the underlying connection.
    pub async fn close(&self) -> Result<(), HandoffError> {
        self.db.close().await
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn insert_tenant(&self, id: &str, display_name: &str) -> Result<Tenant, HandoffError> {
        queries::tenants::insert_tenant(&self.db, id, display_name).await
    }

    async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>, HandoffError> {
        queries::tenants::get_tenant(&self.db, id).await
    }

    async fn insert_conversation(
        &self,
        tenant_id: &str,
        visitor_id: &str,
        page_url: Option<&str>,
    ) -> Result<Conversation, HandoffError> {
        queries::conversations::insert_conversation(&self.db, tenant_id, visitor_id, page_url).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, HandoffError> {
        queries::conversations::get_conversation(&self.db, id).await
    }

    async fn update_support_status(
        &self,
        id: &str,
        status: SupportStatus,
    ) -> Result<bool, HandoffError> {
        queries::conversations::update_support_status(&self.db, id, status).await
    }

    async fn advance_pending_to_in_progress(&self, id: &str) -> Result<bool, HandoffError> {
        queries::conversations::advance_pending_to_in_progress(&self.db, id).await
    }

    async fn mark_escalated(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<Option<Conversation>, HandoffError> {
        queries::conversations::mark_escalated(&self.db, id, reason).await
    }

    async fn mark_ended(&self, id: &str) -> Result<Option<Conversation>, HandoffError> {
        queries::conversations::mark_ended(&self.db, id).await
    }

    async fn insert_message(&self, draft: &MessageDraft) -> Result<Message, HandoffError> {
        queries::messages::insert_message(&self.db, draft).await
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, HandoffError> {
        queries::messages::get_message(&self.db, id).await
    }

    async fn messages_after(
        &self,
        conversation_id: &str,
        cursor: Option<&MessageCursor>,
    ) -> Result<Vec<Message>, HandoffError> {
        queries::messages::messages_after(&self.db, conversation_id, cursor).await
    }

    async fn escalated(
        &self,
        status: Option<SupportStatus>,
        limit: u32,
    ) -> Result<Vec<EscalationRow>, HandoffError> {
        queries::escalations::escalated(&self.db, status, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::SenderType;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_config(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            database_path: dir
                .path()
                .join("store.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn store_works_as_a_trait_object() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&test_config(&dir)).await.unwrap();
        let store: Arc<dyn ConversationStore> = Arc::new(store);

        store.insert_tenant("acme", "Acme Corp").await.unwrap();
        let conv = store
            .insert_conversation("acme", "visitor-1", Some("https://acme.example/pricing"))
            .await
            .unwrap();
        store
            .insert_message(&MessageDraft {
                conversation_id: conv.id.clone(),
                sender_type: SenderType::Visitor,
                content: "hello".to_string(),
                agent_name: None,
            })
            .await
            .unwrap();

        let messages = store.messages_after(&conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hello");

        let escalated = store.mark_escalated(&conv.id, Some("help")).await.unwrap();
        assert!(escalated.unwrap().requires_human_support);
        assert_eq!(store.escalated(None, 100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn open_survives_a_reopen_on_the_same_path() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        let store = SqliteStore::open(&config).await.unwrap();
        store.insert_tenant("acme", "Acme Corp").await.unwrap();
        store.close().await.unwrap();

        let store = SqliteStore::open(&config).await.unwrap();
        let tenant = store.get_tenant("acme").await.unwrap().unwrap();
        assert_eq!(tenant.display_name, "Acme Corp");
        store.close().await.unwrap();
    }
}
