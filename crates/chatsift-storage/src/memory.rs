// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`MessageStore`] backend.
//!
//! Backs tests and ephemeral runs. Unlike the prototype this replaces, the
//! map lives behind an explicit store interface and a lock, never a
//! module-level mutable array shared across requests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chatsift_core::types::{
    Category, CategoryCount, Group, GroupStats, GroupSummary, ListFilter, Overview,
    ProcessedMessage, StoredMessage,
};
use chatsift_core::{ChatsiftError, MessageStore};
use chrono::Utc;

const GROUP_RECENT_LIMIT: usize = 5;
const OVERVIEW_RECENT_LIMIT: usize = 10;

#[derive(Default)]
struct Inner {
    next_id: i64,
    /// Keyed by external id: the uniqueness constraint of the schema.
    messages: HashMap<String, StoredMessage>,
    groups: BTreeMap<String, Group>,
}

/// Ephemeral message store over a locked map.
///
/// The single mutex plays the role of the SQLite writer thread: each upsert
/// holds the lock for its whole read-modify-write, so concurrent upserts of
/// the same external id serialize and the stored row is always one complete
/// write.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_group_locked(inner: &mut Inner, group_id: &str) -> Group {
        inner
            .groups
            .entry(group_id.to_string())
            .or_insert_with(|| Group {
                id: group_id.to_string(),
                name: format!("群組 {group_id}"),
                description: "自動建立的群組".to_string(),
                created_at: Utc::now(),
            })
            .clone()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ChatsiftError> {
        self.inner
            .lock()
            .map_err(|_| ChatsiftError::Internal("memory store lock poisoned".to_string()))
    }
}

fn sorted_newest_first(mut messages: Vec<StoredMessage>) -> Vec<StoredMessage> {
    messages.sort_by(|a, b| {
        b.received_at
            .cmp(&a.received_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    messages
}

fn count_categories(messages: &[&StoredMessage]) -> Vec<CategoryCount> {
    let mut counts: HashMap<Category, i64> = HashMap::new();
    for msg in messages {
        *counts.entry(msg.category).or_default() += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.label().cmp(b.category.label()))
    });
    out
}

#[async_trait]
impl MessageStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn initialize(&self) -> Result<(), ChatsiftError> {
        Ok(())
    }

    async fn upsert(&self, message: ProcessedMessage) -> Result<StoredMessage, ChatsiftError> {
        let mut inner = self.lock()?;
        Self::ensure_group_locked(&mut inner, &message.group_id);

        let now = Utc::now();
        // `id` and `created_at` survive from the first insert; everything
        // else is last-write-wins.
        let existing = inner
            .messages
            .get(&message.external_id)
            .map(|m| (m.id, m.created_at));
        let (id, created_at) = match existing {
            Some(pair) => pair,
            None => {
                inner.next_id += 1;
                (inner.next_id, now)
            }
        };
        let stored = StoredMessage {
            id,
            created_at,
            external_id: message.external_id.clone(),
            group_id: message.group_id,
            sender: message.sender,
            text: message.text,
            summary: message.summary,
            category: message.category,
            received_at: message.received_at,
            processed_at: message.processed_at,
            updated_at: now,
        };
        inner
            .messages
            .insert(message.external_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, external_id: &str) -> Result<Option<StoredMessage>, ChatsiftError> {
        let inner = self.lock()?;
        Ok(inner.messages.get(external_id).cloned())
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<StoredMessage>, ChatsiftError> {
        let inner = self.lock()?;
        let matching: Vec<StoredMessage> = inner
            .messages
            .values()
            .filter(|m| {
                filter
                    .group_id
                    .as_deref()
                    .is_none_or(|g| m.group_id == g)
                    && filter.category.is_none_or(|c| m.category == c)
                    && filter.sender.as_deref().is_none_or(|s| m.sender == s)
            })
            .cloned()
            .collect();
        let sorted = sorted_newest_first(matching);
        let offset = filter.effective_offset() as usize;
        let limit = filter.effective_limit() as usize;
        Ok(sorted.into_iter().skip(offset).take(limit).collect())
    }

    async fn ensure_group(&self, group_id: &str) -> Result<Group, ChatsiftError> {
        let mut inner = self.lock()?;
        Ok(Self::ensure_group_locked(&mut inner, group_id))
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<GroupSummary>, ChatsiftError> {
        let inner = self.lock()?;
        Ok(inner.groups.get(group_id).map(|group| GroupSummary {
            group: group.clone(),
            message_count: inner
                .messages
                .values()
                .filter(|m| m.group_id == group_id)
                .count() as i64,
        }))
    }

    async fn list_groups(&self) -> Result<Vec<GroupSummary>, ChatsiftError> {
        let inner = self.lock()?;
        let mut groups: Vec<GroupSummary> = inner
            .groups
            .values()
            .map(|group| GroupSummary {
                group: group.clone(),
                message_count: inner
                    .messages
                    .values()
                    .filter(|m| m.group_id == group.id)
                    .count() as i64,
            })
            .collect();
        groups.sort_by(|a, b| {
            b.group
                .created_at
                .cmp(&a.group.created_at)
                .then_with(|| a.group.id.cmp(&b.group.id))
        });
        Ok(groups)
    }

    async fn group_stats(&self, group_id: &str) -> Result<GroupStats, ChatsiftError> {
        let inner = self.lock()?;
        let in_group: Vec<&StoredMessage> = inner
            .messages
            .values()
            .filter(|m| m.group_id == group_id)
            .collect();
        let unique_senders = in_group
            .iter()
            .map(|m| m.sender.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;
        let categories = count_categories(&in_group);
        let recent = sorted_newest_first(in_group.iter().map(|m| (*m).clone()).collect())
            .into_iter()
            .take(GROUP_RECENT_LIMIT)
            .collect();
        Ok(GroupStats {
            total_messages: in_group.len() as i64,
            unique_senders,
            categories,
            recent,
        })
    }

    async fn overview(&self) -> Result<Overview, ChatsiftError> {
        let inner = self.lock()?;
        let all: Vec<&StoredMessage> = inner.messages.values().collect();
        let total_groups = all
            .iter()
            .map(|m| m.group_id.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;
        let total_senders = all
            .iter()
            .map(|m| m.sender.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;
        let categories = count_categories(&all);
        let recent_activity = sorted_newest_first(all.iter().map(|m| (*m).clone()).collect())
            .into_iter()
            .take(OVERVIEW_RECENT_LIMIT)
            .collect();
        Ok(Overview {
            total_messages: all.len() as i64,
            total_groups,
            total_senders,
            categories,
            recent_activity,
        })
    }

    async fn close(&self) -> Result<(), ChatsiftError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

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
    async fn upsert_assigns_ids_and_groups() {
        let store = MemoryStore::new();
        let a = store
            .upsert(processed("m1", "g1", "a", "x", Category::Other, 1))
            .await
            .unwrap();
        let b = store
            .upsert(processed("m2", "g1", "a", "y", Category::Other, 2))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);

        let group = store.get_group("g1").await.unwrap().unwrap();
        assert_eq!(group.message_count, 2);
        assert_eq!(group.group.name, "群組 g1");
    }

    #[tokio::test]
    async fn upsert_is_last_write_wins() {
        let store = MemoryStore::new();
        let first = store
            .upsert(processed("m1", "g1", "a", "first", Category::Work, 1))
            .await
            .unwrap();
        let second = store
            .upsert(processed("m1", "g1", "b", "second", Category::Life, 2))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, first.created_at);

        let all = store.list(ListFilter::for_group("g1")).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "second");
        assert_eq!(all[0].sender, "b");
        assert_eq!(all[0].category, Category::Life);
    }

    #[tokio::test]
    async fn list_clamps_and_orders() {
        let store = MemoryStore::new();
        for i in 0..5 {
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
    }

    #[tokio::test]
    async fn stats_match_sqlite_shape() {
        let store = MemoryStore::new();
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
        assert_eq!(stats.categories[0].category, Category::TechTalk);
        assert_eq!(stats.categories[0].count, 2);
        assert_eq!(stats.recent[0].external_id, "m3");

        let overview = store.overview().await.unwrap();
        assert_eq!(overview.total_messages, 3);
        assert_eq!(overview.total_groups, 1);
    }
}
