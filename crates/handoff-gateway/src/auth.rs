// SPDX-FileCopyrightText: 2026 Handoff Contributors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authorization for the operator surface.
//!
//! The widget routes are open by design; everything under `/operator`
//! passes through [`operator_auth`] first. The middleware extracts the
//! bearer token and the conversation id from the request and defers the
//! decision to the configured [`Authorizer`], failing closed on any
//! missing or malformed credential.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use handoff_core::Authorizer;
use tracing::warn;

/// Shared-secret authorizer: one static token covers the whole operator
/// surface, regardless of conversation.
///
/// With no token configured every request is rejected, so a deployment
/// that forgets to set one locks the operator surface instead of
/// opening it.
pub struct BearerAuthorizer {
    token: Option<String>,
}

impl BearerAuthorizer {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl fmt::Debug for BearerAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthorizer")
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[async_trait]
impl Authorizer for BearerAuthorizer {
    async fn is_authorized(&self, caller: &str, _conversation_id: &str) -> bool {
        match &self.token {
            Some(token) => !caller.is_empty() && caller == token,
            None => false,
        }
    }
}

/// Middleware guarding the operator routes.
///
/// The caller credential is the `Authorization: Bearer <token>` header;
/// the conversation id comes from the route path when present and is
/// empty for cross-conversation operations such as the escalation
/// queue listing.
pub async fn operator_auth(
    State(authorizer): State<Arc<dyn Authorizer>>,
    path: Option<Path<String>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");

    let conversation_id = path.as_ref().map(|Path(id)| id.as_str()).unwrap_or("");

    if authorizer.is_authorized(caller, conversation_id).await {
        Ok(next.run(request).await)
    } else {
        warn!(
            path = %request.uri().path(),
            "rejected unauthorized operator request"
        );
        Err(StatusCode::UNAUTHORIZED)
    }
}
