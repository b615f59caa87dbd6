// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Handoff core: escalation state machine, append-only message ledger,
//! stateless poll cursor protocol, escalation queue view, and reply
//! gateway.
//!
//! All coordination is delegated to the [`handoff_core::ConversationStore`]
//! behind [`HandoffEngine`]; the engine itself is stateless between calls,
//! which is what makes polling idempotent and the queue view safe to
//! recompute on any instance.

pub mod engine;
pub mod escalation;
pub mod ledger;
pub mod lifecycle;
pub mod poll;
pub mod queue;
pub mod reply;

pub use engine::HandoffEngine;
pub use ledger::{AppendOutcome, StatusTransition};
pub use poll::PollResponse;
pub use queue::{EscalationEntry, QUEUE_PAGE_SIZE};
pub use reply::ReplyReceipt;
