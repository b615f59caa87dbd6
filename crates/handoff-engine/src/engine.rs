// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`HandoffEngine`]: the core's single entry point, delegating to the
//! per-concern modules.

use std::sync::Arc;

use handoff_core::{Conversation, ConversationStore, HandoffError, Message, SenderType};

use crate::escalation;
use crate::ledger::{self, AppendOutcome};
use crate::lifecycle;
use crate::poll::{self, PollResponse};
use crate::queue::{self, EscalationEntry};
use crate::reply::{self, ReplyReceipt};

/// Engine over a conversation store. Holds no other state: every operation
/// is one or two store round trips, so concurrent requests coordinate only
/// through the store's per-row atomicity.
#[derive(Clone)]
pub struct HandoffEngine {
    store: Arc<dyn ConversationStore>,
}

impl HandoffEngine {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for callers that need raw access (tests,
    /// seeding).
    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// See [`lifecycle::start_conversation`].
    pub async fn start_conversation(
        &self,
        tenant_id: &str,
        visitor_id: &str,
        page_url: Option<&str>,
    ) -> Result<Conversation, HandoffError> {
        lifecycle::start_conversation(self.store.as_ref(), tenant_id, visitor_id, page_url).await
    }

    /// See [`lifecycle::end_conversation`].
    pub async fn end_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Conversation, HandoffError> {
        lifecycle::end_conversation(self.store.as_ref(), conversation_id).await
    }

    /// See [`escalation::escalate`].
    pub async fn escalate(
        &self,
        conversation_id: &str,
        reason: Option<&str>,
    ) -> Result<Conversation, HandoffError> {
        escalation::escalate(self.store.as_ref(), conversation_id, reason).await
    }

    /// See [`escalation::set_status`].
    pub async fn set_status(
        &self,
        conversation_id: &str,
        status: &str,
    ) -> Result<Conversation, HandoffError> {
        escalation::set_status(self.store.as_ref(), conversation_id, status).await
    }

    /// See [`ledger::append`].
    pub async fn append(
        &self,
        conversation_id: &str,
        sender_type: SenderType,
        content: &str,
        agent_name: Option<&str>,
    ) -> Result<AppendOutcome, HandoffError> {
        ledger::append(
            self.store.as_ref(),
            conversation_id,
            sender_type,
            content,
            agent_name,
        )
        .await
    }

    /// See [`ledger::list_since`].
    pub async fn list_since(
        &self,
        conversation_id: &str,
        after_message_id: Option<&str>,
    ) -> Result<Vec<Message>, HandoffError> {
        ledger::list_since(self.store.as_ref(), conversation_id, after_message_id).await
    }

    /// See [`poll::poll`].
    pub async fn poll(
        &self,
        conversation_id: &str,
        after_message_id: Option<&str>,
    ) -> Result<PollResponse, HandoffError> {
        poll::poll(self.store.as_ref(), conversation_id, after_message_id).await
    }

    /// See [`reply::reply`].
    pub async fn reply(
        &self,
        conversation_id: &str,
        content: &str,
        agent_name: Option<&str>,
    ) -> Result<ReplyReceipt, HandoffError> {
        reply::reply(self.store.as_ref(), conversation_id, content, agent_name).await
    }

    /// See [`queue::list_escalations`].
    pub async fn list_escalations(
        &self,
        status_filter: Option<&str>,
    ) -> Result<Vec<EscalationEntry>, HandoffError> {
        queue::list_escalations(self.store.as_ref(), status_filter).await
    }
}
