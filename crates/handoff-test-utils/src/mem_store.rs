// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`ConversationStore`] for deterministic testing.
//!
//! `MemStore` mirrors the SQLite store's semantics (store-assigned ids and
//! timestamps, set-once escalation, conditional status transitions) without
//! touching disk. Two knobs make awkward scenarios reproducible:
//!
//! - [`MemStore::freeze_clock`] stops the virtual clock, so consecutive
//!   appends share one timestamp and ordering falls back to the id tiebreak;
//! - [`MemStore::fail_status_updates`] makes the status-transition calls
//!   return [`HandoffError::StoreUnavailable`], for exercising partial-failure
//!   paths where an append lands but the follow-up transition does not.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use handoff_core::{
    Conversation, ConversationStore, EscalationRow, HandoffError, Message, MessageCursor,
    MessageDraft, SupportStatus, Tenant,
};

/// 2026-01-01T00:00:00Z, the virtual clock's epoch.
const CLOCK_BASE_UNIX: i64 = 1_767_225_600;

fn format_ts(ms_offset: u64) -> String {
    let instant = DateTime::<Utc>::UNIX_EPOCH
        + Duration::milliseconds(CLOCK_BASE_UNIX * 1000 + ms_offset as i64);
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[derive(Default)]
struct Inner {
    tenants: HashMap<String, Tenant>,
    conversations: HashMap<String, Conversation>,
    messages: Vec<Message>,
    next_id: u64,
    clock_ms: u64,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:08}", self.next_id)
    }

    fn now(&mut self, frozen: bool) -> String {
        let stamp = format_ts(self.clock_ms);
        if !frozen {
            self.clock_ms += 1;
        }
        stamp
    }
}

/// In-memory store with a deterministic virtual clock.
///
/// Ids are sequential (`c00000001`, `m00000002`, ...) and timestamps tick one
/// millisecond per assignment from a fixed epoch, so test assertions on
/// ordering never race the wall clock.
pub struct MemStore {
    inner: Mutex<Inner>,
    clock_frozen: AtomicBool,
    status_updates_fail: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock_frozen: AtomicBool::new(false),
            status_updates_fail: AtomicBool::new(false),
        }
    }

    /// Stop the virtual clock. Subsequent store-assigned timestamps repeat
    /// the current instant until [`MemStore::thaw_clock`].
    pub fn freeze_clock(&self) {
        self.clock_frozen.store(true, Ordering::SeqCst);
    }

    /// Resume the virtual clock.
    pub fn thaw_clock(&self) {
        self.clock_frozen.store(false, Ordering::SeqCst);
    }

    /// When set, `update_support_status` and `advance_pending_to_in_progress`
    /// fail with [`HandoffError::StoreUnavailable`]. Appends keep working.
    pub fn fail_status_updates(&self, fail: bool) {
        self.status_updates_fail.store(fail, Ordering::SeqCst);
    }

    fn status_update_error(&self) -> Option<HandoffError> {
        if self.status_updates_fail.load(Ordering::SeqCst) {
            Some(HandoffError::StoreUnavailable {
                source: "status updates disabled by test".to_string().into(),
            })
        } else {
            None
        }
    }

    fn constraint(message: String) -> HandoffError {
        HandoffError::StoreUnavailable {
            source: message.into(),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemStore {
    async fn insert_tenant(&self, id: &str, display_name: &str) -> Result<Tenant, HandoffError> {
        let frozen = self.clock_frozen.load(Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        if inner.tenants.contains_key(id) {
            return Err(Self::constraint(format!("tenant already exists: {id}")));
        }
        let created_at = inner.now(frozen);
        let tenant = Tenant {
            id: id.to_string(),
            display_name: display_name.to_string(),
            created_at,
        };
        inner.tenants.insert(id.to_string(), tenant.clone());
        Ok(tenant)
    }

    async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>, HandoffError> {
        let inner = self.inner.lock().await;
        Ok(inner.tenants.get(id).cloned())
    }

    async fn insert_conversation(
        &self,
        tenant_id: &str,
        visitor_id: &str,
        page_url: Option<&str>,
    ) -> Result<Conversation, HandoffError> {
        let frozen = self.clock_frozen.load(Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        if !inner.tenants.contains_key(tenant_id) {
            return Err(Self::constraint(format!("no such tenant: {tenant_id}")));
        }
        let id = inner.next_id("c");
        let created_at = inner.now(frozen);
        let conversation = Conversation {
            id: id.clone(),
            tenant_id: tenant_id.to_string(),
            visitor_id: visitor_id.to_string(),
            page_url: page_url.map(|s| s.to_string()),
            requires_human_support: false,
            human_support_status: SupportStatus::None,
            escalated_at: None,
            escalation_reason: None,
            ended_at: None,
            created_at,
        };
        inner.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, HandoffError> {
        let inner = self.inner.lock().await;
        Ok(inner.conversations.get(id).cloned())
    }

    async fn update_support_status(
        &self,
        id: &str,
        status: SupportStatus,
    ) -> Result<bool, HandoffError> {
        if let Some(err) = self.status_update_error() {
            return Err(err);
        }
        let mut inner = self.inner.lock().await;
        match inner.conversations.get_mut(id) {
            Some(conversation) => {
                conversation.human_support_status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn advance_pending_to_in_progress(&self, id: &str) -> Result<bool, HandoffError> {
        if let Some(err) = self.status_update_error() {
            return Err(err);
        }
        let mut inner = self.inner.lock().await;
        match inner.conversations.get_mut(id) {
            Some(conversation) if conversation.human_support_status == SupportStatus::Pending => {
                conversation.human_support_status = SupportStatus::InProgress;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_escalated(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<Option<Conversation>, HandoffError> {
        let frozen = self.clock_frozen.load(Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        if !inner.conversations.contains_key(id) {
            return Ok(None);
        }
        let escalated_at = inner.now(frozen);
        let conversation = match inner.conversations.get_mut(id) {
            Some(c) => c,
            None => return Ok(None),
        };
        if !conversation.requires_human_support {
            conversation.requires_human_support = true;
            conversation.human_support_status = SupportStatus::Pending;
            conversation.escalated_at = Some(escalated_at);
            conversation.escalation_reason = reason.map(|s| s.to_string());
        }
        Ok(Some(conversation.clone()))
    }

    async fn mark_ended(&self, id: &str) -> Result<Option<Conversation>, HandoffError> {
        let frozen = self.clock_frozen.load(Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        if !inner.conversations.contains_key(id) {
            return Ok(None);
        }
        let ended_at = inner.now(frozen);
        let conversation = match inner.conversations.get_mut(id) {
            Some(c) => c,
            None => return Ok(None),
        };
        if conversation.ended_at.is_none() {
            conversation.ended_at = Some(ended_at);
        }
        Ok(Some(conversation.clone()))
    }

    async fn insert_message(&self, draft: &MessageDraft) -> Result<Message, HandoffError> {
        let frozen = self.clock_frozen.load(Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        if !inner.conversations.contains_key(&draft.conversation_id) {
            return Err(Self::constraint(format!(
                "no such conversation: {}",
                draft.conversation_id
            )));
        }
        let id = inner.next_id("m");
        let created_at = inner.now(frozen);
        let message = Message {
            id,
            conversation_id: draft.conversation_id.clone(),
            sender: draft.sender_type.sender(),
            sender_type: draft.sender_type,
            content: draft.content.clone(),
            agent_name: draft.agent_name.clone(),
            created_at,
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, HandoffError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn messages_after(
        &self,
        conversation_id: &str,
        cursor: Option<&MessageCursor>,
    ) -> Result<Vec<Message>, HandoffError> {
        let inner = self.inner.lock().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .filter(|m| match cursor {
                Some(after) => MessageCursor::from(*m) > *after,
                None => true,
            })
            .cloned()
            .collect();
        messages.sort_by(|a, b| MessageCursor::from(a).cmp(&MessageCursor::from(b)));
        Ok(messages)
    }

    async fn escalated(
        &self,
        status: Option<SupportStatus>,
        limit: u32,
    ) -> Result<Vec<EscalationRow>, HandoffError> {
        let inner = self.inner.lock().await;
        let mut escalated: Vec<&Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.requires_human_support)
            .filter(|c| status.is_none_or(|s| c.human_support_status == s))
            .collect();
        escalated.sort_by(|a, b| b.escalated_at.cmp(&a.escalated_at).then(b.id.cmp(&a.id)));
        escalated.truncate(limit as usize);

        let rows = escalated
            .into_iter()
            .map(|conversation| {
                let tenant_name = inner
                    .tenants
                    .get(&conversation.tenant_id)
                    .map(|t| t.display_name.clone())
                    .unwrap_or_default();
                let message_count = inner
                    .messages
                    .iter()
                    .filter(|m| m.conversation_id == conversation.id)
                    .count() as u64;
                let last_visitor_message = inner
                    .messages
                    .iter()
                    .filter(|m| {
                        m.conversation_id == conversation.id
                            && m.sender_type == handoff_core::SenderType::Visitor
                    })
                    .max_by(|a, b| MessageCursor::from(*a).cmp(&MessageCursor::from(*b)))
                    .map(|m| m.content.clone());
                EscalationRow {
                    conversation: conversation.clone(),
                    tenant_name,
                    message_count,
                    last_visitor_message,
                }
            })
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::SenderType;

    fn draft(conversation_id: &str, content: &str) -> MessageDraft {
        MessageDraft {
            conversation_id: conversation_id.to_string(),
            sender_type: SenderType::Visitor,
            content: content.to_string(),
            agent_name: None,
        }
    }

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

    #[tokio::test]
    async fn timestamps_tick_one_millisecond_per_assignment() {
        let (store, conv_id) = store_with_conversation().await;

        let first = store.insert_message(&draft(&conv_id, "one")).await.unwrap();
        let second = store.insert_message(&draft(&conv_id, "two")).await.unwrap();
        assert!(first.created_at < second.created_at);
        assert!(first.created_at.starts_with("2026-01-01T00:00:00."));
    }

    #[tokio::test]
    async fn frozen_clock_produces_timestamp_ties() {
        let (store, conv_id) = store_with_conversation().await;

        store.freeze_clock();
        let first = store.insert_message(&draft(&conv_id, "one")).await.unwrap();
        let second = store.insert_message(&draft(&conv_id, "two")).await.unwrap();
        store.thaw_clock();
        assert_eq!(first.created_at, second.created_at);
        assert!(first.id < second.id);

        // The tie resolves through the id when paging past the first message.
        let after = store
            .messages_after(&conv_id, Some(&MessageCursor::from(&first)))
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, second.id);
    }

    #[tokio::test]
    async fn failing_status_updates_spare_appends() {
        let (store, conv_id) = store_with_conversation().await;
        store.mark_escalated(&conv_id, None).await.unwrap();

        store.fail_status_updates(true);
        let err = store
            .advance_pending_to_in_progress(&conv_id)
            .await
            .unwrap_err();
        assert!(err.is_retryable_read());
        store.insert_message(&draft(&conv_id, "still lands")).await.unwrap();

        store.fail_status_updates(false);
        assert!(store.advance_pending_to_in_progress(&conv_id).await.unwrap());
    }

    #[tokio::test]
    async fn mirrors_sqlite_escalation_semantics() {
        let (store, conv_id) = store_with_conversation().await;

        let first = store
            .mark_escalated(&conv_id, Some("billing question"))
            .await
            .unwrap()
            .unwrap();
        let again = store
            .mark_escalated(&conv_id, Some("different reason"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.escalated_at, again.escalated_at);
        assert_eq!(again.escalation_reason.as_deref(), Some("billing question"));

        assert!(store.mark_escalated("missing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn escalated_joins_tenant_and_message_aggregates() {
        let (store, conv_id) = store_with_conversation().await;
        store.mark_escalated(&conv_id, None).await.unwrap();
        store.insert_message(&draft(&conv_id, "first")).await.unwrap();
        store
            .insert_message(&MessageDraft {
                sender_type: SenderType::AiAgent,
                ..draft(&conv_id, "bot answer")
            })
            .await
            .unwrap();
        store.insert_message(&draft(&conv_id, "latest ask")).await.unwrap();

        let rows = store.escalated(None, 100).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tenant_name, "Acme Corp");
        assert_eq!(rows[0].message_count, 3);
        assert_eq!(rows[0].last_visitor_message.as_deref(), Some("latest ask"));
    }
}
