// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the chatsift pipeline, storage, and gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Hard cap applied to every listing query, regardless of the requested limit.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Default page size when a listing request carries no limit.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Group id assigned to messages whose source provides none.
pub const DEFAULT_GROUP_ID: &str = "default";

/// Sender name assigned to messages whose source provides none.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Fixed closed set of message category labels.
///
/// The wire and storage representation is the Traditional Chinese label the
/// upstream group conversations use; variant names are English for code use.
/// Every stored message carries exactly one of these, never null.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Category {
    /// Programming, bugs, infrastructure talk.
    #[strum(serialize = "技術討論")]
    #[serde(rename = "技術討論")]
    TechTalk,
    /// Meetings, projects, deadlines.
    #[strum(serialize = "工作相關")]
    #[serde(rename = "工作相關")]
    Work,
    /// Food, entertainment, daily life.
    #[strum(serialize = "生活分享")]
    #[serde(rename = "生活分享")]
    Life,
    /// Requests for assistance.
    #[strum(serialize = "問題求助")]
    #[serde(rename = "問題求助")]
    Help,
    /// Gatherings, announcements, reminders.
    #[strum(serialize = "活動通知")]
    #[serde(rename = "活動通知")]
    Event,
    /// Fallback when no rule matches.
    #[strum(serialize = "其他")]
    #[serde(rename = "其他")]
    Other,
}

impl Category {
    /// All categories in declaration order. `Other` is last and is the
    /// classifier fallback.
    pub const ALL: [Category; 6] = [
        Category::TechTalk,
        Category::Work,
        Category::Life,
        Category::Help,
        Category::Event,
        Category::Other,
    ];

    /// The canonical label string stored in the database and sent on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Category::TechTalk => "技術討論",
            Category::Work => "工作相關",
            Category::Life => "生活分享",
            Category::Help => "問題求助",
            Category::Event => "活動通知",
            Category::Other => "其他",
        }
    }

    /// Parses a label, returning `None` for anything outside the fixed set.
    ///
    /// This is the validation gate for remote classification responses: an
    /// out-of-vocabulary label must never reach a caller.
    pub fn parse_label(label: &str) -> Option<Category> {
        label.trim().parse().ok()
    }
}

/// A raw message as it arrives from any origin: scraper output, webhook
/// payload, or a manual API call. All fields except `text` are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    /// Stable source-assigned message id, if the origin has one.
    #[serde(default)]
    pub id: Option<String>,
    /// Conversation/thread the message belongs to.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Display name of the author.
    #[serde(default)]
    pub sender: Option<String>,
    /// Message body.
    pub text: String,
    /// RFC 3339 timestamp from the source (best effort).
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A validated, normalized message draft produced by the source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    /// Idempotency key: source id verbatim, or deterministically synthesized.
    pub external_id: String,
    pub group_id: String,
    pub sender: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// A draft plus the derived fields, ready for a single upsert.
///
/// `category` and `summary` are always both present; there is no partially
/// processed state.
#[derive(Debug, Clone)]
pub struct ProcessedMessage {
    pub external_id: String,
    pub group_id: String,
    pub sender: String,
    pub text: String,
    pub summary: String,
    pub category: Category,
    pub received_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedMessage {
    /// Combines a draft with its derived fields.
    pub fn from_draft(
        draft: MessageDraft,
        summary: String,
        category: Category,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            external_id: draft.external_id,
            group_id: draft.group_id,
            sender: draft.sender,
            text: draft.text,
            summary,
            category,
            received_at: draft.received_at,
            processed_at,
        }
    }
}

/// A message row as persisted by a store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Server-assigned row id.
    pub id: i64,
    pub external_id: String,
    pub group_id: String,
    pub sender: String,
    pub text: String,
    pub summary: String,
    pub category: Category,
    pub received_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A conversation group. Created lazily on first message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// External group/thread id.
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A group together with its message count, for listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: Group,
    pub message_count: i64,
}

/// Count of messages in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: i64,
}

/// Aggregate statistics for one group, computed at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub total_messages: i64,
    pub unique_senders: i64,
    /// Per-category counts; zero-count categories are omitted.
    pub categories: Vec<CategoryCount>,
    /// Most recent messages, newest first.
    pub recent: Vec<StoredMessage>,
}

/// Dashboard-level statistics across all groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub total_messages: i64,
    pub total_groups: i64,
    pub total_senders: i64,
    pub categories: Vec<CategoryCount>,
    /// Most recent messages across all groups, newest first.
    pub recent_activity: Vec<StoredMessage>,
}

/// Filter and pagination parameters for message listings.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub group_id: Option<String>,
    pub category: Option<Category>,
    pub sender: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListFilter {
    /// Returns all messages for one group, newest first, default page size.
    pub fn for_group(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Default::default()
        }
    }

    /// The limit actually applied: requested limit clamped to
    /// [1, `MAX_LIST_LIMIT`], defaulting to `DEFAULT_LIST_LIMIT`.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }

    /// The offset actually applied: non-negative, defaulting to zero.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_label_round_trip() {
        for cat in Category::ALL {
            let parsed = Category::from_str(cat.label()).expect("label should parse back");
            assert_eq!(cat, parsed);
            assert_eq!(cat.to_string(), cat.label());
        }
    }

    #[test]
    fn category_parse_rejects_out_of_vocabulary() {
        assert_eq!(Category::parse_label("八卦"), None);
        assert_eq!(Category::parse_label(""), None);
        assert_eq!(Category::parse_label("Technical Discussion"), None);
    }

    #[test]
    fn category_parse_trims_whitespace() {
        assert_eq!(Category::parse_label(" 技術討論\n"), Some(Category::TechTalk));
    }

    #[test]
    fn category_serde_uses_labels() {
        let json = serde_json::to_string(&Category::Life).unwrap();
        assert_eq!(json, "\"生活分享\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Life);
    }

    #[test]
    fn raw_message_deserializes_with_only_text() {
        let raw: RawMessage = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(raw.text, "hello");
        assert!(raw.id.is_none());
        assert!(raw.group_id.is_none());
        assert!(raw.sender.is_none());
        assert!(raw.timestamp.is_none());
    }

    #[test]
    fn effective_limit_clamps_to_maximum() {
        let filter = ListFilter {
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), MAX_LIST_LIMIT);
    }

    #[test]
    fn effective_limit_defaults_when_absent() {
        assert_eq!(ListFilter::default().effective_limit(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn effective_limit_floors_at_one() {
        let filter = ListFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), 1);
    }

    #[test]
    fn effective_offset_never_negative() {
        let filter = ListFilter {
            offset: Some(-3),
            ..Default::default()
        };
        assert_eq!(filter.effective_offset(), 0);
    }
}
