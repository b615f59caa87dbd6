// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization predicate for the operator surface.

use async_trait::async_trait;

/// Decides whether a caller may act on the operator surface.
///
/// Session validation lives outside this core; the engine and gateway
/// consume it as an opaque predicate. `conversation_id` is empty for
/// cross-conversation operations such as the escalation queue.
#[async_trait]
pub trait Authorizer: Send + Sync + 'static {
    /// Returns `true` when `caller` may act on the given conversation.
    ///
    /// Implementations must fail closed: any doubt (missing credential,
    /// unknown caller) is a `false`.
    async fn is_authorized(&self, caller: &str, conversation_id: &str) -> bool;
}
