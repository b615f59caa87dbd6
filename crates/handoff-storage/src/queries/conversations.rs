// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD and the conditional support-state updates.

use handoff_core::{Conversation, HandoffError, SupportStatus};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::queries::column_enum;

pub(crate) fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    let status: String = row.get(5)?;
    Ok(Conversation {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        visitor_id: row.get(2)?,
        page_url: row.get(3)?,
        requires_human_support: row.get(4)?,
        human_support_status: column_enum(5, status)?,
        escalated_at: row.get(6)?,
        escalation_reason: row.get(7)?,
        ended_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Create a conversation with a fresh id and store-assigned timestamp.
/// New conversations start un-escalated with status `none`.
pub async fn insert_conversation(
    db: &Database,
    tenant_id: &str,
    visitor_id: &str,
    page_url: Option<&str>,
) -> Result<Conversation, HandoffError> {
    let id = Uuid::new_v4().to_string();
    let tenant_id = tenant_id.to_string();
    let visitor_id = visitor_id.to_string();
    let page_url = page_url.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, tenant_id, visitor_id, page_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![id, tenant_id, visitor_id, page_url],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, tenant_id, visitor_id, page_url, requires_human_support,
                        human_support_status, escalated_at, escalation_reason, ended_at, created_at
                 FROM conversations WHERE id = ?1",
            )?;
            let conversation = stmt.query_row(params![id], row_to_conversation)?;
            Ok(conversation)
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, HandoffError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tenant_id, visitor_id, page_url, requires_human_support,
                        human_support_status, escalated_at, escalation_reason, ended_at, created_at
                 FROM conversations WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Overwrite `human_support_status` and nothing else.
///
/// Deliberately unconditional: the operator console may move status in any
/// direction, including back to `pending`. Returns `false` when no row
/// matched the id.
pub async fn update_support_status(
    db: &Database,
    id: &str,
    status: SupportStatus,
) -> Result<bool, HandoffError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversations SET human_support_status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Atomically move `pending` to `in_progress` (first human reply).
///
/// The status check lives in the WHERE clause so concurrent repliers cannot
/// both observe `pending`; exactly one caller gets `true`.
pub async fn advance_pending_to_in_progress(
    db: &Database,
    id: &str,
) -> Result<bool, HandoffError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversations SET human_support_status = 'in_progress'
                 WHERE id = ?1 AND human_support_status = 'pending'",
                params![id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Escalate a conversation to human support, once.
///
/// The `requires_human_support = 0` guard keeps `escalated_at` set-once
/// under concurrent escalations; a later call returns the row untouched.
/// Returns `None` when the conversation does not exist.
pub async fn mark_escalated(
    db: &Database,
    id: &str,
    reason: Option<&str>,
) -> Result<Option<Conversation>, HandoffError> {
    let id = id.to_string();
    let reason = reason.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET requires_human_support = 1,
                     human_support_status = 'pending',
                     escalated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     escalation_reason = ?2
                 WHERE id = ?1 AND requires_human_support = 0",
                params![id, reason],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, tenant_id, visitor_id, page_url, requires_human_support,
                        human_support_status, escalated_at, escalation_reason, ended_at, created_at
                 FROM conversations WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Record the widget-closed signal, once. A second call leaves the original
/// `ended_at` in place. Returns `None` when the conversation does not exist.
pub async fn mark_ended(db: &Database, id: &str) -> Result<Option<Conversation>, HandoffError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET ended_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND ended_at IS NULL",
                params![id],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, tenant_id, visitor_id, page_url, requires_human_support,
                        human_support_status, escalated_at, escalation_reason, ended_at, created_at
                 FROM conversations WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_db_err)
}
