// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message ledger operations: append and cursor-ordered reads.

use handoff_core::{HandoffError, Message, MessageCursor, MessageDraft};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::queries::column_enum;

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let sender: String = row.get(2)?;
    let sender_type: String = row.get(3)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender: column_enum(2, sender)?,
        sender_type: column_enum(3, sender_type)?,
        content: row.get(4)?,
        agent_name: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Append a message with a fresh id and store-assigned timestamp.
///
/// `sender` is derived from the draft's `sender_type`, so the stored pair
/// can never disagree. Returns the row exactly as later reads deliver it.
pub async fn insert_message(db: &Database, draft: &MessageDraft) -> Result<Message, HandoffError> {
    let id = Uuid::new_v4().to_string();
    let conversation_id = draft.conversation_id.clone();
    let sender = draft.sender_type.sender().to_string();
    let sender_type = draft.sender_type.to_string();
    let content = draft.content.clone();
    let agent_name = draft.agent_name.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender, sender_type, content, agent_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![id, conversation_id, sender, sender_type, content, agent_name],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender, sender_type, content, agent_name, created_at
                 FROM messages WHERE id = ?1",
            )?;
            let message = stmt.query_row(params![id], row_to_message)?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Get a message by ID (poll cursor resolution).
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, HandoffError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender, sender_type, content, agent_name, created_at
                 FROM messages WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_message);
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Messages of a conversation strictly after the cursor, ascending by the
/// composite `(created_at, id)` key. `None` returns the full ledger.
pub async fn messages_after(
    db: &Database,
    conversation_id: &str,
    cursor: Option<&MessageCursor>,
) -> Result<Vec<Message>, HandoffError> {
    let conversation_id = conversation_id.to_string();
    let cursor = cursor.cloned();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match &cursor {
                Some(after) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, sender, sender_type, content, agent_name, created_at
                         FROM messages
                         WHERE conversation_id = ?1
                           AND (created_at > ?2 OR (created_at = ?2 AND id > ?3))
                         ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map(
                        params![conversation_id, after.created_at, after.id],
                        row_to_message,
                    )?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, sender, sender_type, content, agent_name, created_at
                         FROM messages
                         WHERE conversation_id = ?1
                         ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_db_err)
}
