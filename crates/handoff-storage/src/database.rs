// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use handoff_core::HandoffError;
use tracing::debug;

/// Handle to the SQLite database behind the single writer thread.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path` with WAL mode,
    /// run pending migrations, and configure connection pragmas.
    pub async fn open(path: &str) -> Result<Self, HandoffError> {
        Self::open_with(path, true).await
    }

    /// Like [`Database::open`], with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, HandoffError> {
        let parent = std::path::Path::new(path).parent();
        if let Some(dir) = parent {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| HandoffError::StoreUnavailable {
                    source: Box::new(e),
                })?;
            }
        }

        // Migrations run on a short-lived synchronous connection before the
        // writer thread starts, so refinery errors never cross the async
        // call boundary. The journal mode is persistent in the file.
        {
            let mut conn = rusqlite::Connection::open(path).map_err(map_sqlite_err)?;
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            // journal_mode returns the resulting mode as a row, so the
            // plain pragma_update would report ExecuteReturnedResults.
            conn.pragma_update_and_check(None, "journal_mode", journal, |_| Ok(()))
                .map_err(map_sqlite_err)?;
            crate::migrations::run_migrations(&mut conn)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sqlite_err)?;

        // Per-connection pragmas must be applied to the writer connection
        // itself; only the journal mode persists in the file.
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_db_err)?;

        debug!(path = %path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection. All queries go through
    /// `connection().call(...)`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so readers of the bare file see a consistent
    /// database. Call before shutdown.
    pub async fn close(&self) -> Result<(), HandoffError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_db_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the core error type at the crate boundary.
pub(crate) fn map_db_err(e: tokio_rusqlite::Error) -> HandoffError {
    HandoffError::StoreUnavailable {
        source: Box::new(e),
    }
}

/// Map a bare rusqlite error (from the synchronous migration connection).
fn map_sqlite_err(e: rusqlite::Error) -> HandoffError {
    HandoffError::StoreUnavailable {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open re-runs the migration runner against an up-to-date
        // schema history and must succeed.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fk.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let result = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO conversations (id, tenant_id, visitor_id) VALUES ('c1', 'ghost', 'v1')",
                    [],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await;
        assert!(result.is_err(), "dangling tenant_id must be rejected");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_journal_mode_is_respected() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("rollback.db");
        let db = Database::open_with(db_path.to_str().unwrap(), false)
            .await
            .unwrap();

        let mode: String = db
            .connection()
            .call(|conn| {
                let m = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                Ok::<_, rusqlite::Error>(m)
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");

        db.close().await.unwrap();
    }
}
