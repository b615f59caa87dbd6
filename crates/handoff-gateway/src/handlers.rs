// SPDX-FileCopyrightText: 2026 Handoff Contributors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response types and handler functions for the HTTP surface.
//!
//! Widget handlers serve the embedded chat client and are deliberately
//! open; operator handlers sit behind the bearer middleware and are
//! never reachable without it. All bodies are JSON with snake_case
//! keys, matching the storage representation so nothing is renamed in
//! flight.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use handoff_core::{Conversation, HandoffError, Message, SenderType};
use handoff_engine::{EscalationEntry, PollResponse, ReplyReceipt};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Body for `POST /widget/v1/conversations`.
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    /// Tenant that owns the embedding page.
    pub tenant_id: String,
    /// Opaque visitor identity minted by the widget embed.
    pub visitor_id: String,
    /// Page the widget was loaded on, when the embed reports one.
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Body for `POST /widget/v1/conversations/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    /// Message body as typed. Surrounding whitespace is trimmed on append.
    pub content: String,
    /// Author of the message; omitted means the visitor. `human_agent`
    /// is rejected on this open route, operator replies carry it via
    /// the authorized reply endpoint instead.
    #[serde(default)]
    pub sender_type: Option<SenderType>,
    /// Display name to attribute `ai_agent` messages to.
    #[serde(default)]
    pub agent_name: Option<String>,
}

/// Query string for `GET /widget/v1/conversations/{id}/poll`.
#[derive(Debug, Deserialize)]
pub struct PollQuery {
    /// Id of the last message the client already has. Omitted or
    /// unresolvable means a full replay.
    #[serde(default)]
    pub after: Option<String>,
}

/// Body for `POST /widget/v1/conversations/{id}/escalate`.
#[derive(Debug, Default, Deserialize)]
pub struct EscalateRequest {
    /// Visitor-stated reason for requesting a human.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query string for `GET /operator/v1/escalations`.
#[derive(Debug, Deserialize)]
pub struct EscalationsQuery {
    /// Restrict the queue to one support status (`pending`,
    /// `in_progress`, `resolved`).
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for `POST /operator/v1/conversations/{id}/reply`.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    /// Reply text to deliver to the visitor.
    pub content: String,
    /// Name of the human agent, shown in the widget.
    #[serde(default)]
    pub agent_name: Option<String>,
}

/// Body for `PUT /operator/v1/conversations/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target support status: `pending`, `in_progress`, or `resolved`.
    pub status: String,
}

/// Body returned by `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// `GET /health`: liveness probe, no dependencies touched.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// `POST /widget/v1/conversations`: open a conversation for a visitor.
pub async fn post_conversations(
    State(state): State<GatewayState>,
    Json(body): Json<StartConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = state
        .engine
        .start_conversation(&body.tenant_id, &body.visitor_id, body.page_url.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// `POST /widget/v1/conversations/{id}/messages`: append to the ledger.
pub async fn post_messages(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Json(body): Json<AppendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let sender_type = body.sender_type.unwrap_or(SenderType::Visitor);
    if sender_type == SenderType::HumanAgent {
        return Err(HandoffError::Validation(
            "human agent messages must go through the operator reply endpoint".to_string(),
        )
        .into());
    }
    let outcome = state
        .engine
        .append(
            &conversation_id,
            sender_type,
            &body.content,
            body.agent_name.as_deref(),
        )
        .await?;
    Ok(Json(outcome.message))
}

/// `GET /widget/v1/conversations/{id}/poll`: new messages plus live
/// escalation flags.
pub async fn get_poll(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<PollQuery>,
) -> Result<Json<PollResponse>, ApiError> {
    let response = state
        .engine
        .poll(&conversation_id, query.after.as_deref())
        .await?;
    Ok(Json(response))
}

/// `POST /widget/v1/conversations/{id}/escalate`: request a human.
///
/// The body is optional; an escalation without a reason is legitimate.
pub async fn post_escalate(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    body: Option<Json<EscalateRequest>>,
) -> Result<Json<Conversation>, ApiError> {
    let reason = body.and_then(|Json(b)| b.reason);
    let conversation = state
        .engine
        .escalate(&conversation_id, reason.as_deref())
        .await?;
    Ok(Json(conversation))
}

/// `POST /widget/v1/conversations/{id}/end`: close the conversation.
pub async fn post_end(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state.engine.end_conversation(&conversation_id).await?;
    Ok(Json(conversation))
}

/// `GET /operator/v1/escalations`: the escalation queue, newest first.
pub async fn get_escalations(
    State(state): State<GatewayState>,
    Query(query): Query<EscalationsQuery>,
) -> Result<Json<Vec<EscalationEntry>>, ApiError> {
    let entries = state.engine.list_escalations(query.status.as_deref()).await?;
    Ok(Json(entries))
}

/// `POST /operator/v1/conversations/{id}/reply`: deliver a human reply.
pub async fn post_reply(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Json(body): Json<ReplyRequest>,
) -> Result<Json<ReplyReceipt>, ApiError> {
    let receipt = state
        .engine
        .reply(&conversation_id, &body.content, body.agent_name.as_deref())
        .await?;
    Ok(Json(receipt))
}

/// `PUT /operator/v1/conversations/{id}/status`: move the support status.
pub async fn put_status(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state.engine.set_status(&conversation_id, &body.status).await?;
    Ok(Json(conversation))
}
