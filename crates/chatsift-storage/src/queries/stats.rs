// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate statistics, computed over the stored set at call time.

use chatsift_core::ChatsiftError;
use chatsift_core::types::{CategoryCount, GroupStats, Overview};
use rusqlite::{Connection, params};

use super::{MESSAGE_COLUMNS, parse_category, row_to_message};
use crate::database::{Database, map_tr_err};

/// How many recent messages a group stats response includes.
const GROUP_RECENT_LIMIT: i64 = 5;

/// How many recent messages the dashboard overview includes.
const OVERVIEW_RECENT_LIMIT: i64 = 10;

/// Per-group aggregates: totals, distinct senders, category distribution,
/// recent activity.
pub async fn group_stats(db: &Database, group_id: &str) -> Result<GroupStats, ChatsiftError> {
    let group_id = group_id.to_string();
    db.connection()
        .call(move |conn| {
            let (total_messages, unique_senders) = conn.query_row(
                "SELECT COUNT(*), COUNT(DISTINCT sender) FROM messages WHERE group_id = ?1",
                params![group_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let categories = category_counts(
                conn,
                "SELECT category, COUNT(*) AS count FROM messages WHERE group_id = ?1
                 GROUP BY category ORDER BY count DESC, category",
                &group_id,
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE group_id = ?1
                 ORDER BY received_at DESC, id DESC LIMIT {GROUP_RECENT_LIMIT}"
            ))?;
            let rows = stmt.query_map(params![group_id], row_to_message)?;
            let mut recent = Vec::new();
            for row in rows {
                recent.push(row?);
            }

            Ok(GroupStats {
                total_messages,
                unique_senders,
                categories,
                recent,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Dashboard aggregates across all groups.
pub async fn overview(db: &Database) -> Result<Overview, ChatsiftError> {
    db.connection()
        .call(|conn| {
            let (total_messages, total_groups, total_senders) = conn.query_row(
                "SELECT COUNT(*), COUNT(DISTINCT group_id), COUNT(DISTINCT sender) FROM messages",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

            let mut stmt = conn.prepare(
                "SELECT category, COUNT(*) AS count FROM messages
                 GROUP BY category ORDER BY count DESC, category",
            )?;
            let rows = stmt.query_map([], |row| {
                let label: String = row.get(0)?;
                Ok((label, row.get::<_, i64>(1)?))
            })?;
            let mut categories = Vec::new();
            for row in rows {
                let (label, count) = row?;
                categories.push(CategoryCount {
                    category: parse_category(0, &label)?,
                    count,
                });
            }

            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 ORDER BY received_at DESC, id DESC LIMIT {OVERVIEW_RECENT_LIMIT}"
            ))?;
            let rows = stmt.query_map([], row_to_message)?;
            let mut recent_activity = Vec::new();
            for row in rows {
                recent_activity.push(row?);
            }

            Ok(Overview {
                total_messages,
                total_groups,
                total_senders,
                categories,
                recent_activity,
            })
        })
        .await
        .map_err(map_tr_err)
}

fn category_counts(
    conn: &Connection,
    sql: &str,
    group_id: &str,
) -> rusqlite::Result<Vec<CategoryCount>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![group_id], |row| {
        let label: String = row.get(0)?;
        Ok((label, row.get::<_, i64>(1)?))
    })?;
    let mut counts = Vec::new();
    for row in rows {
        let (label, count) = row?;
        counts.push(CategoryCount {
            category: parse_category(0, &label)?,
            count,
        });
    }
    Ok(counts)
}
