// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-rule message classification.
//!
//! Classifies message text into one of the fixed categories using an ordered
//! rule table with case-insensitive substring matching. No network, no
//! latency, deterministic for a fixed table.

use chatsift_core::types::Category;

/// Ordered classification rules: the first category whose keyword set
/// matches wins. Latin keywords are lowercase; matching lowercases the
/// input, so `API` and `Bug` match too.
///
/// Declaration order is the priority order. `技術討論` is evaluated before
/// `問題求助` so that "怎麼解決這個 bug" lands in the technical bucket even
/// though `怎麼` is a help-request keyword.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::TechTalk,
        &[
            "程式", "代碼", "bug", "error", "api", "database", "server", "開發", "技術", "code",
            "programming", "webhook", "資料庫",
        ],
    ),
    (
        Category::Work,
        &[
            "工作", "會議", "專案", "deadline", "報告", "客戶", "同事", "老闆", "meeting",
            "project",
        ],
    ),
    (
        Category::Life,
        &[
            "吃飯", "電影", "音樂", "旅遊", "購物", "美食", "娛樂", "休閒", "餐廳", "推薦",
            "food", "movie", "travel",
        ],
    ),
    (
        Category::Help,
        &[
            "問題", "求助", "幫忙", "如何", "怎麼", "為什麼", "help", "question", "problem",
            "issue",
        ],
    ),
    (
        Category::Event,
        &["活動", "聚會", "通知", "提醒", "event", "party", "announcement"],
    ),
];

/// Classify message text into exactly one category.
///
/// Evaluates the rule table in declaration order and returns the first
/// category with a case-insensitive substring match anywhere in `text`.
/// Returns [`Category::Other`] when no rule matches — total over all inputs,
/// never null or out-of-vocabulary.
pub fn classify(text: &str) -> Category {
    let lower = text.to_lowercase();
    for (category, keywords) in RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    Category::Other
}

/// The rule table, exposed for documentation endpoints and tests.
pub fn rules() -> &'static [(Category, &'static [&'static str])] {
    RULES
}
