// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`MessageStore`].

use async_trait::async_trait;
use chatsift_config::model::StorageConfig;
use chatsift_core::types::{
    Group, GroupStats, GroupSummary, ListFilter, Overview, ProcessedMessage, StoredMessage,
};
use chatsift_core::{ChatsiftError, MessageStore};

use crate::database::Database;
use crate::queries;

/// Persistent message store over a WAL-mode SQLite database.
///
/// All reads and writes go through the single writer thread owned by
/// [`Database`]; see that module for the concurrency model.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database at the configured path, applying migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, ChatsiftError> {
        let db = Database::open(config).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), ChatsiftError> {
        self.db.ping().await
    }

    async fn upsert(&self, message: ProcessedMessage) -> Result<StoredMessage, ChatsiftError> {
        // Lazy group creation keeps the foreign key satisfied.
        queries::groups::ensure_group(&self.db, &message.group_id).await?;
        queries::messages::upsert_message(&self.db, message).await
    }

    async fn get(&self, external_id: &str) -> Result<Option<StoredMessage>, ChatsiftError> {
        queries::messages::get_message(&self.db, external_id).await
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<StoredMessage>, ChatsiftError> {
        queries::messages::list_messages(&self.db, filter).await
    }

    async fn ensure_group(&self, group_id: &str) -> Result<Group, ChatsiftError> {
        queries::groups::ensure_group(&self.db, group_id).await
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<GroupSummary>, ChatsiftError> {
        queries::groups::get_group_summary(&self.db, group_id).await
    }

    async fn list_groups(&self) -> Result<Vec<GroupSummary>, ChatsiftError> {
        queries::groups::list_groups(&self.db).await
    }

    async fn group_stats(&self, group_id: &str) -> Result<GroupStats, ChatsiftError> {
        queries::stats::group_stats(&self.db, group_id).await
    }

    async fn overview(&self) -> Result<Overview, ChatsiftError> {
        queries::stats::overview(&self.db).await
    }

    async fn close(&self) -> Result<(), ChatsiftError> {
        self.db.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatsift_core::types::Category;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    async fn open_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            backend: "sqlite".to_string(),
            database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
            busy_timeout_ms: 2000,
        };
        let store = SqliteStore::open(&config).await.unwrap();
        (store, dir)
    }

    fn processed(
        external_id: &str,
        group: &str,
        sender: &str,
        text: &str,
        category: Category,
        received_secs: i64,
    ) -> ProcessedMessage {
        let received_at = Utc.timestamp_opt(received_secs, 0).unwrap();
        ProcessedMessage {
            external_id: external_id.to_string(),
            group_id: group.to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
            summary: text.to_string(),
            category,
            received_at,
            processed_at: received_at,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_and_creates_group_lazily() {
        let (store, _dir) = open_store().await;

        let stored = store
            .upsert(processed("m1", "g1", "張三", "hello", Category::Other, 10))
            .await
            .unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.external_id, "m1");

        let group = store.get_group("g1").await.unwrap().unwrap();
        assert_eq!(group.group.name, "群組 g1");
        assert_eq!(group.group.description, "自動建立的群組");
        assert_eq!(group.message_count, 1);

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_same_external_id_is_last_write_wins() {
        let (store, _dir) = open_store().await;

        let first = store
            .upsert(processed("m1", "g1", "a", "first text", Category::Work, 10))
            .await
            .unwrap();
        let second = store
            .upsert(processed("m1", "g1", "b", "second text", Category::Life, 20))
            .await
            .unwrap();

        // One row, all mutable fields from the second call.
        assert_eq!(first.id, second.id);
        assert_eq!(second.text, "second text");
        assert_eq!(second.sender, "b");
        assert_eq!(second.category, Category::Life);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        let all = store.list(ListFilter::for_group("g1")).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "second text");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_clamps_limit() {
        let (store, _dir) = open_store().await;

        for i in 0..5 {
            store
                .upsert(processed(
                    &format!("m{i}"),
                    "g1",
                    "s",
                    &format!("text {i}"),
                    Category::Other,
                    100 + i,
                ))
                .await
                .unwrap();
        }

        let listed = store
            .list(ListFilter {
                group_id: Some("g1".to_string()),
                limit: Some(1000),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(listed.len(), 5);
        assert_eq!(listed[0].external_id, "m4");
        assert_eq!(listed[4].external_id, "m0");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_category_and_sender() {
        let (store, _dir) = open_store().await;

        store
            .upsert(processed("m1", "g1", "a", "bug report", Category::TechTalk, 1))
            .await
            .unwrap();
        store
            .upsert(processed("m2", "g1", "b", "開會", Category::Work, 2))
            .await
            .unwrap();
        store
            .upsert(processed("m3", "g2", "a", "更多 bug", Category::TechTalk, 3))
            .await
            .unwrap();

        let tech = store
            .list(ListFilter {
                category: Some(Category::TechTalk),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(tech.len(), 2);

        let tech_in_g1 = store
            .list(ListFilter {
                group_id: Some("g1".to_string()),
                category: Some(Category::TechTalk),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(tech_in_g1.len(), 1);
        assert_eq!(tech_in_g1[0].external_id, "m1");

        let from_a = store
            .list(ListFilter {
                sender: Some("a".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(from_a.len(), 2);

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn pagination_offset_walks_the_set() {
        let (store, _dir) = open_store().await;
        for i in 0..4 {
            store
                .upsert(processed(
                    &format!("m{i}"),
                    "g1",
                    "s",
                    "x",
                    Category::Other,
                    10 + i,
                ))
                .await
                .unwrap();
        }

        let page = store
            .list(ListFilter {
                group_id: Some("g1".to_string()),
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].external_id, "m1");
        assert_eq!(page[1].external_id, "m0");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn group_stats_aggregates_counts() {
        let (store, _dir) = open_store().await;

        store
            .upsert(processed("m1", "g1", "a", "bug", Category::TechTalk, 1))
            .await
            .unwrap();
        store
            .upsert(processed("m2", "g1", "b", "bug 2", Category::TechTalk, 2))
            .await
            .unwrap();
        store
            .upsert(processed("m3", "g1", "a", "吃飯", Category::Life, 3))
            .await
            .unwrap();

        let stats = store.group_stats("g1").await.unwrap();
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.unique_senders, 2);
        assert_eq!(stats.categories.len(), 2);
        assert_eq!(stats.categories[0].category, Category::TechTalk);
        assert_eq!(stats.categories[0].count, 2);
        assert_eq!(stats.recent.len(), 3);
        assert_eq!(stats.recent[0].external_id, "m3");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn overview_spans_groups() {
        let (store, _dir) = open_store().await;

        store
            .upsert(processed("m1", "g1", "a", "bug", Category::TechTalk, 1))
            .await
            .unwrap();
        store
            .upsert(processed("m2", "g2", "b", "開會", Category::Work, 2))
            .await
            .unwrap();

        let overview = store.overview().await.unwrap();
        assert_eq!(overview.total_messages, 2);
        assert_eq!(overview.total_groups, 2);
        assert_eq!(overview.total_senders, 2);
        assert_eq!(overview.categories.len(), 2);
        assert_eq!(overview.recent_activity.len(), 2);

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let (store, _dir) = open_store().await;
        assert!(store.get("missing").await.unwrap().is_none());
        assert!(store.get_group("missing").await.unwrap().is_none());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_upserts_of_same_id_leave_one_complete_row() {
        let (store, _dir) = open_store().await;
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert(processed(
                        "race",
                        "g1",
                        &format!("sender-{i}"),
                        &format!("text {i}"),
                        Category::Other,
                        50,
                    ))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let rows = store.list(ListFilter::for_group("g1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        // The row is one of the writes in full, never a mix of two.
        let suffix = rows[0].sender.strip_prefix("sender-").unwrap().to_string();
        assert_eq!(rows[0].text, format!("text {suffix}"));

        store.close().await.unwrap();
    }
}
