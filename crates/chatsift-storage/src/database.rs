// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread: the `Database` struct IS the single writer, and the bounded
//! "pool" (size one — excess callers queue on its channel). Do NOT create
//! additional Connection instances for writes.

use std::path::Path;

use chatsift_config::model::StorageConfig;
use chatsift_core::ChatsiftError;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the SQLite database.
///
/// Opening runs PRAGMA setup and all pending migrations. Query modules
/// accept `&Database` and go through `connection().call()`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at the configured path.
    pub async fn open(config: &StorageConfig) -> Result<Self, ChatsiftError> {
        let path = config.database_path.clone();
        if let Some(parent) = Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ChatsiftError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path.clone())
            .await
            .map_err(|e| ChatsiftError::Storage {
                source: Box::new(e),
            })?;

        let wal_mode = config.wal_mode;
        let busy_timeout_ms = config.busy_timeout_ms;
        conn.call(move |c| {
            if wal_mode {
                // journal_mode returns the resulting mode as a row.
                let mode: String =
                    c.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
                debug!(mode = mode.as_str(), "journal mode set");
            }
            c.pragma_update(None, "foreign_keys", "ON")?;
            c.pragma_update(None, "busy_timeout", busy_timeout_ms)?;
            c.pragma_update(None, "synchronous", "NORMAL")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        let report = conn
            .call(move |c| Ok(migrations::run_migrations(c)))
            .await
            .map_err(map_tr_err)?;
        report?;

        info!(path = path.as_str(), "sqlite database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs a trivial query to verify the connection is alive.
    pub async fn ping(&self) -> Result<(), ChatsiftError> {
        self.conn
            .call(|c| {
                c.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Close the connection, flushing pending work.
    pub async fn close(&self) -> Result<(), ChatsiftError> {
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| ChatsiftError::Storage {
                source: Box::new(e),
            })
    }
}

/// Map a tokio-rusqlite error into the storage error taxonomy.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> ChatsiftError {
    ChatsiftError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_at(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend: "sqlite".to_string(),
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
            busy_timeout_ms: 2000,
        }
    }

    #[tokio::test]
    async fn open_creates_database_and_migrates() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&config_at(&db_path)).await.unwrap();
        db.ping().await.unwrap();

        // Migration created the tables.
        let count: i64 = db
            .connection()
            .call(|c| {
                Ok::<i64, rusqlite::Error>(c.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('groups', 'messages')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(count, 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let config = config_at(&db_path);

        let db = Database::open(&config).await.unwrap();
        db.close().await.unwrap();

        // Migrations already applied; second open must not fail.
        let db = Database::open(&config).await.unwrap();
        db.ping().await.unwrap();
        db.close().await.unwrap();
    }
}
