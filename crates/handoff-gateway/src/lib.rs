// SPDX-FileCopyrightText: 2026 Handoff Contributors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Handoff platform.
//!
//! Serves the embedded widget's conversation surface, the
//! bearer-authorized operator surface, and a public health probe, all
//! on one listener. Handlers stay thin: every decision about
//! escalation state, ledger ordering, or queue shape lives in
//! [`handoff_engine`], and this crate only translates between HTTP and
//! those calls.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::BearerAuthorizer;
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, ServerConfig, router, start_server};
