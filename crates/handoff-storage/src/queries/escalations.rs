// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation queue reads: escalated conversations joined with tenant and
//! message aggregates, newest escalation first.

use handoff_core::{EscalationRow, HandoffError, SupportStatus};
use rusqlite::params;

use crate::database::Database;
use crate::queries::conversations::row_to_conversation;

fn row_to_escalation(row: &rusqlite::Row<'_>) -> rusqlite::Result<EscalationRow> {
    let conversation = row_to_conversation(row)?;
    let message_count: i64 = row.get(11)?;
    Ok(EscalationRow {
        conversation,
        tenant_name: row.get(10)?,
        message_count: message_count as u64,
        last_visitor_message: row.get(12)?,
    })
}

const ESCALATION_COLUMNS: &str = "c.id, c.tenant_id, c.visitor_id, c.page_url, \
     c.requires_human_support, c.human_support_status, c.escalated_at, \
     c.escalation_reason, c.ended_at, c.created_at, \
     t.display_name, \
     (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id), \
     (SELECT m.content FROM messages m \
      WHERE m.conversation_id = c.id AND m.sender_type = 'visitor' \
      ORDER BY m.created_at DESC, m.id DESC LIMIT 1)";

/// Escalated conversations, most recently escalated first, optionally
/// filtered to one support status. The aggregates ride along in the same
/// statement so the queue never needs a second round trip per row.
pub async fn escalated(
    db: &Database,
    status: Option<SupportStatus>,
    limit: u32,
) -> Result<Vec<EscalationRow>, HandoffError> {
    db.connection()
        .call(move |conn| {
            let mut rows_out = Vec::new();
            match status {
                Some(filter) => {
                    let sql = format!(
                        "SELECT {ESCALATION_COLUMNS}
                         FROM conversations c
                         JOIN tenants t ON t.id = c.tenant_id
                         WHERE c.requires_human_support = 1 AND c.human_support_status = ?1
                         ORDER BY c.escalated_at DESC, c.id DESC
                         LIMIT ?2",
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows =
                        stmt.query_map(params![filter.to_string(), limit], row_to_escalation)?;
                    for row in rows {
                        rows_out.push(row?);
                    }
                }
                None => {
                    let sql = format!(
                        "SELECT {ESCALATION_COLUMNS}
                         FROM conversations c
                         JOIN tenants t ON t.id = c.tenant_id
                         WHERE c.requires_human_support = 1
                         ORDER BY c.escalated_at DESC, c.id DESC
                         LIMIT ?1",
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(params![limit], row_to_escalation)?;
                    for row in rows {
                        rows_out.push(row?);
                    }
                }
            }
            Ok(rows_out)
        })
        .await
        .map_err(crate::database::map_db_err)
}
