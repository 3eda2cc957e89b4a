// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store backends for chatsift.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, plus an in-memory
//! map backend for tests and ephemeral runs. The backend is selected from
//! configuration at startup via [`open_store`].

pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod sqlite;

use std::sync::Arc;

use chatsift_config::model::StorageConfig;
use chatsift_core::{ChatsiftError, MessageStore};
use tracing::info;

pub use database::Database;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Open the store backend named by `storage.backend`.
///
/// `"sqlite"` opens (and migrates) the database at `storage.database_path`;
/// `"memory"` builds an ephemeral map store. Unknown names are a
/// configuration error — validation normally catches them before this point.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn MessageStore>, ChatsiftError> {
    let store: Arc<dyn MessageStore> = match config.backend.trim() {
        "sqlite" => Arc::new(SqliteStore::open(config).await?),
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            return Err(ChatsiftError::Config(format!(
                "unknown storage backend `{other}`"
            )));
        }
    };
    store.initialize().await?;
    info!(backend = store.name(), "message store ready");
    Ok(store)
}
