// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Handoff workspace.
//!
//! Timestamps are millisecond-precision UTC RFC 3339 strings assigned by the
//! store (`2026-01-01T00:00:00.000Z`), so lexicographic comparison equals
//! temporal comparison and every row carries a single clock source.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a conversation's human-support episode.
///
/// `None` means no escalation; the remaining states form the episode
/// `pending -> in_progress -> resolved`. Wire and storage representation is
/// the snake_case string (`"in_progress"`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    #[default]
    None,
    Pending,
    InProgress,
    Resolved,
}

/// Coarse author class the widget uses to pick a chat bubble side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// Precise author of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Visitor,
    AiAgent,
    HumanAgent,
}

impl SenderType {
    /// The rendering-side class this author maps to. Human agents render on
    /// the bot side of the widget, so the pair (sender, sender_type) can
    /// never disagree.
    pub fn sender(self) -> Sender {
        match self {
            SenderType::Visitor => Sender::User,
            SenderType::AiAgent | SenderType::HumanAgent => Sender::Bot,
        }
    }
}

/// A customer account that embeds the widget on its pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub display_name: String,
    pub created_at: String,
}

/// A widget conversation and its human-support state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub tenant_id: String,
    pub visitor_id: String,
    pub page_url: Option<String>,
    pub requires_human_support: bool,
    pub human_support_status: SupportStatus,
    pub escalated_at: Option<String>,
    pub escalation_reason: Option<String>,
    pub ended_at: Option<String>,
    pub created_at: String,
}

/// A single entry in a conversation's append-only message ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender: Sender,
    pub sender_type: SenderType,
    pub content: String,
    pub agent_name: Option<String>,
    pub created_at: String,
}

/// Payload for a new message. The store assigns `id` and `created_at`, and
/// derives `sender` from `sender_type`, so callers cannot produce rows that
/// break the ledger's ordering or author invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub conversation_id: String,
    pub sender_type: SenderType,
    pub content: String,
    pub agent_name: Option<String>,
}

/// Composite ordering key of a message, used as the poll cursor.
///
/// Messages are totally ordered by `(created_at, id)`; ties at millisecond
/// granularity fall back to the id comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MessageCursor {
    pub created_at: String,
    pub id: String,
}

impl From<&Message> for MessageCursor {
    fn from(message: &Message) -> Self {
        MessageCursor {
            created_at: message.created_at.clone(),
            id: message.id.clone(),
        }
    }
}

/// Raw store row backing one escalation queue entry: the conversation joined
/// with its tenant's display name, the total message count, and the most
/// recent visitor-authored message (untruncated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationRow {
    pub conversation: Conversation,
    pub tenant_name: String,
    pub message_count: u64,
    pub last_visitor_message: Option<String>,
}
