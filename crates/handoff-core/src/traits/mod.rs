// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams of the Handoff core.
//!
//! The escalation and synchronization engine is written against these traits
//! so the persistent store and the session-validation boundary stay
//! swappable. All traits use `#[async_trait]` for dynamic dispatch
//! compatibility.

pub mod auth;
pub mod store;

// Re-export the traits at the module level for convenience.
pub use auth::Authorizer;
pub use store::ConversationStore;
