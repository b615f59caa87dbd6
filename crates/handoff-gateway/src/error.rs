// SPDX-FileCopyrightText: 2026 Handoff Contributors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use handoff_core::HandoffError;
use serde::Serialize;
use tracing::error;

/// JSON body returned for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong.
    pub error: String,
}

/// Wrapper that lets handlers return `HandoffError` with `?`.
///
/// Client mistakes keep their message in the body; server-side failures
/// are logged in full and answered with a generic body so internal
/// details never leak to the widget.
#[derive(Debug)]
pub struct ApiError(pub HandoffError);

impl From<HandoffError> for ApiError {
    fn from(err: HandoffError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HandoffError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            HandoffError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            HandoffError::StoreUnavailable { .. } => {
                error!(error = %self.0, "conversation store unavailable while serving request");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "conversation store unavailable".to_string(),
                )
            }
            HandoffError::Config(_) | HandoffError::Internal(_) => {
                error!(error = %self.0, "internal error while serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
