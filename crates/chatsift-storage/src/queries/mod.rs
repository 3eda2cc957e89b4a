// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations over the SQLite schema.

pub mod groups;
pub mod messages;
pub mod stats;

use chatsift_core::types::{Category, Group, StoredMessage};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

/// Column list shared by every message SELECT, in `row_to_message` order.
pub(crate) const MESSAGE_COLUMNS: &str = "id, external_id, group_id, sender, content, summary, \
     category, received_at, processed_at, created_at, updated_at";

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that
/// lexicographic ordering matches chronological ordering.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, false)
}

pub(crate) fn parse_ts(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_category(idx: usize, value: &str) -> rusqlite::Result<Category> {
    value
        .parse::<Category>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a row selected with [`MESSAGE_COLUMNS`] into a [`StoredMessage`].
pub(crate) fn row_to_message(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    let category: String = row.get(6)?;
    let received_at: String = row.get(7)?;
    let processed_at: String = row.get(8)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(StoredMessage {
        id: row.get(0)?,
        external_id: row.get(1)?,
        group_id: row.get(2)?,
        sender: row.get(3)?,
        text: row.get(4)?,
        summary: row.get(5)?,
        category: parse_category(6, &category)?,
        received_at: parse_ts(7, &received_at)?,
        processed_at: parse_ts(8, &processed_at)?,
        created_at: parse_ts(9, &created_at)?,
        updated_at: parse_ts(10, &updated_at)?,
    })
}

/// Map a `id, name, description, created_at` row into a [`Group`].
pub(crate) fn row_to_group(row: &Row<'_>) -> rusqlite::Result<Group> {
    let created_at: String = row.get(3)?;
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_ts(3, &created_at)?,
    })
}
