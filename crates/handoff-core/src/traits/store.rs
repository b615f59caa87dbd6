// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for conversations, messages, and tenants.

use async_trait::async_trait;

use crate::error::HandoffError;
use crate::types::{
    Conversation, EscalationRow, Message, MessageCursor, MessageDraft, SupportStatus, Tenant,
};

/// Transactional store for the conversation and message ledger.
///
/// Implementations must uphold two invariants the engine relies on:
///
/// - every assigned `created_at` comes from a single store-side clock, so
///   the composite `(created_at, id)` key totally orders each conversation's
///   ledger;
/// - the conditional updates ([`advance_pending_to_in_progress`],
///   [`mark_escalated`], [`mark_ended`]) are atomic read-modify-writes, so
///   concurrent callers cannot double-apply a transition.
///
/// [`advance_pending_to_in_progress`]: ConversationStore::advance_pending_to_in_progress
/// [`mark_escalated`]: ConversationStore::mark_escalated
/// [`mark_ended`]: ConversationStore::mark_ended
#[async_trait]
pub trait ConversationStore: Send + Sync + 'static {
    /// Inserts a tenant with the given id and returns the stored row.
    async fn insert_tenant(
        &self,
        id: &str,
        display_name: &str,
    ) -> Result<Tenant, HandoffError>;

    /// Looks up a tenant by id.
    async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>, HandoffError>;

    /// Creates a conversation for the tenant. The store assigns the id,
    /// `created_at`, and the initial support state (not escalated, status
    /// `none`).
    async fn insert_conversation(
        &self,
        tenant_id: &str,
        visitor_id: &str,
        page_url: Option<&str>,
    ) -> Result<Conversation, HandoffError>;

    /// Looks up a conversation by id.
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, HandoffError>;

    /// Overwrites `human_support_status` and nothing else. Returns `false`
    /// when the conversation does not exist.
    async fn update_support_status(
        &self,
        id: &str,
        status: SupportStatus,
    ) -> Result<bool, HandoffError>;

    /// Atomically moves `human_support_status` from `pending` to
    /// `in_progress`. Returns `true` only when this call performed the
    /// transition; `false` when the conversation is absent or in any other
    /// state.
    async fn advance_pending_to_in_progress(&self, id: &str) -> Result<bool, HandoffError>;

    /// Sets `requires_human_support`, `human_support_status = pending`,
    /// `escalated_at = now`, and the reason, unless the conversation is
    /// already escalated (then the row is left untouched, keeping
    /// `escalated_at` set-once). Returns the row after the operation, or
    /// `None` when the conversation does not exist.
    async fn mark_escalated(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<Option<Conversation>, HandoffError>;

    /// Sets `ended_at = now` unless already set. Returns the row after the
    /// operation, or `None` when the conversation does not exist.
    async fn mark_ended(&self, id: &str) -> Result<Option<Conversation>, HandoffError>;

    /// Appends a message. The store assigns `id` and `created_at` and
    /// derives `sender` from the draft's `sender_type`; the returned row is
    /// what later polls will deliver.
    async fn insert_message(&self, draft: &MessageDraft) -> Result<Message, HandoffError>;

    /// Looks up a message by id (cursor resolution).
    async fn get_message(&self, id: &str) -> Result<Option<Message>, HandoffError>;

    /// All messages of the conversation with a composite key strictly
    /// greater than the cursor, ascending by `(created_at, id)`. `None`
    /// returns the full ledger.
    async fn messages_after(
        &self,
        conversation_id: &str,
        cursor: Option<&MessageCursor>,
    ) -> Result<Vec<Message>, HandoffError>;

    /// Conversations with `requires_human_support` set, optionally filtered
    /// by status, newest escalation first, at most `limit` rows, each joined
    /// with its tenant name, message count, and last visitor message.
    async fn escalated(
        &self,
        status: Option<SupportStatus>,
        limit: u32,
    ) -> Result<Vec<EscalationRow>, HandoffError>;
}
