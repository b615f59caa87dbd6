// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Handoff platform.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Handoff workspace: the conversation and
//! message model, the human-support status machine, and the seams
//! ([`ConversationStore`], [`Authorizer`]) the engine is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HandoffError;
pub use types::{
    Conversation, EscalationRow, Message, MessageCursor, MessageDraft, Sender, SenderType,
    SupportStatus, Tenant,
};

pub use traits::{Authorizer, ConversationStore};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn handoff_error_has_all_variants() {
        // Verify all 5 error variants exist and can be constructed.
        let _validation = HandoffError::Validation("test".into());
        let _not_found = HandoffError::NotFound {
            entity: "conversation",
            id: "test".into(),
        };
        let _store = HandoffError::StoreUnavailable {
            source: Box::new(std::io::Error::other("test")),
        };
        let _config = HandoffError::Config("test".into());
        let _internal = HandoffError::Internal("test".into());
    }

    #[test]
    fn only_store_failures_are_retryable_reads() {
        let store = HandoffError::StoreUnavailable {
            source: Box::new(std::io::Error::other("locked")),
        };
        assert!(store.is_retryable_read());

        assert!(!HandoffError::Validation("empty content".into()).is_retryable_read());
        assert!(
            !HandoffError::NotFound {
                entity: "message",
                id: "m1".into()
            }
            .is_retryable_read()
        );
    }

    #[test]
    fn support_status_wire_strings() {
        let variants = [
            (SupportStatus::None, "none"),
            (SupportStatus::Pending, "pending"),
            (SupportStatus::InProgress, "in_progress"),
            (SupportStatus::Resolved, "resolved"),
        ];

        for (variant, wire) in &variants {
            // Display, FromStr, and serde must all agree on the snake_case form.
            assert_eq!(variant.to_string(), *wire);
            assert_eq!(SupportStatus::from_str(wire).expect("should parse"), *variant);

            let json = serde_json::to_string(variant).expect("should serialize");
            assert_eq!(json, format!("\"{wire}\""));
        }

        assert!(SupportStatus::from_str("in-progress").is_err());
        assert_eq!(SupportStatus::default(), SupportStatus::None);
    }

    #[test]
    fn sender_derivation_from_sender_type() {
        // The widget renders visitor messages on the user side and
        // everything else on the bot side.
        assert_eq!(SenderType::Visitor.sender(), Sender::User);
        assert_eq!(SenderType::AiAgent.sender(), Sender::Bot);
        assert_eq!(SenderType::HumanAgent.sender(), Sender::Bot);
    }

    #[test]
    fn message_cursor_orders_by_timestamp_then_id() {
        let early = MessageCursor {
            created_at: "2026-01-01T00:00:00.100Z".into(),
            id: "z".into(),
        };
        let late = MessageCursor {
            created_at: "2026-01-01T00:00:00.200Z".into(),
            id: "a".into(),
        };
        assert!(early < late, "timestamp dominates id");

        let tie_a = MessageCursor {
            created_at: "2026-01-01T00:00:00.100Z".into(),
            id: "a".into(),
        };
        assert!(tie_a < early, "id breaks millisecond ties");
    }

    #[test]
    fn trait_objects_are_constructible() {
        // Both seams must stay object-safe; the engine and gateway hold them
        // as Arc<dyn _>.
        fn _store(_: &dyn ConversationStore) {}
        fn _auth(_: &dyn Authorizer) {}
    }
}
