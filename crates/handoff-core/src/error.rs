// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Handoff platform.

use thiserror::Error;

/// The primary error type used across all Handoff traits and core operations.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The caller supplied an invalid request (empty content, unknown status
    /// value, dangling conversation id on the widget surface).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The backing store failed or was unreachable.
    #[error("store unavailable: {source}")]
    StoreUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HandoffError {
    /// Whether an operation that failed with this error may be blindly retried.
    ///
    /// Only transient store failures qualify, and only for reads: a retried
    /// append could duplicate the write, so writers must surface the failure
    /// instead of looping.
    pub fn is_retryable_read(&self) -> bool {
        matches!(self, HandoffError::StoreUnavailable { .. })
    }
}
