// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait for persistence backends (SQLite, in-memory).

use async_trait::async_trait;

use crate::error::ChatsiftError;
use crate::types::{
    Group, GroupStats, GroupSummary, ListFilter, Overview, ProcessedMessage, StoredMessage,
};

/// Persistence backend for processed messages and their groups.
///
/// Implementations must make `upsert` idempotent on `external_id`: for a fixed
/// external id at most one row exists at any time, and concurrent upserts of
/// the same id serialize so the stored row is always one complete write,
/// never a field-level mix of two calls.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Human-readable backend name for logs and health output.
    fn name(&self) -> &str;

    /// Prepares the backend (migrations, pragmas). Safe to call once at startup.
    async fn initialize(&self) -> Result<(), ChatsiftError>;

    /// Inserts a new row or fully replaces the row matching `external_id`
    /// (last write wins). The owning group is created lazily if absent.
    async fn upsert(&self, message: ProcessedMessage) -> Result<StoredMessage, ChatsiftError>;

    /// Looks up a single message by its external id.
    async fn get(&self, external_id: &str) -> Result<Option<StoredMessage>, ChatsiftError>;

    /// Lists messages matching the filter, ordered by `received_at`
    /// descending. The limit is clamped to `MAX_LIST_LIMIT`.
    async fn list(&self, filter: ListFilter) -> Result<Vec<StoredMessage>, ChatsiftError>;

    /// Creates the group if it does not exist and returns it.
    async fn ensure_group(&self, group_id: &str) -> Result<Group, ChatsiftError>;

    /// Looks up a group with its message count.
    async fn get_group(&self, group_id: &str) -> Result<Option<GroupSummary>, ChatsiftError>;

    /// All groups with message counts, newest first.
    async fn list_groups(&self) -> Result<Vec<GroupSummary>, ChatsiftError>;

    /// Aggregate counts for one group, computed over the full stored set at
    /// call time.
    async fn group_stats(&self, group_id: &str) -> Result<GroupStats, ChatsiftError>;

    /// Dashboard aggregates across all groups.
    async fn overview(&self) -> Result<Overview, ChatsiftError>;

    /// Flushes pending writes and releases resources.
    async fn close(&self) -> Result<(), ChatsiftError>;
}
