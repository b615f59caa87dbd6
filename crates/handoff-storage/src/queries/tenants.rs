// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant lookups. Provisioning is out of scope; insert exists so the
//! escalation queue join and the tests have a source for display names.

use handoff_core::{HandoffError, Tenant};
use rusqlite::params;

use crate::database::Database;

fn row_to_tenant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        id: row.get(0)?,
        display_name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Insert a tenant and return the stored row with its assigned timestamp.
pub async fn insert_tenant(
    db: &Database,
    id: &str,
    display_name: &str,
) -> Result<Tenant, HandoffError> {
    let id = id.to_string();
    let display_name = display_name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tenants (id, display_name, created_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![id, display_name],
            )?;
            let mut stmt = conn.prepare(
                "SELECT id, display_name, created_at FROM tenants WHERE id = ?1",
            )?;
            let tenant = stmt.query_row(params![id], row_to_tenant)?;
            Ok(tenant)
        })
        .await
        .map_err(crate::database::map_db_err)
}

/// Get a tenant by ID.
pub async fn get_tenant(db: &Database, id: &str) -> Result<Option<Tenant>, HandoffError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, created_at FROM tenants WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_tenant);
            match result {
                Ok(tenant) => Ok(Some(tenant)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_db_err)
}
