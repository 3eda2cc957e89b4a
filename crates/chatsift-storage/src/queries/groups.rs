// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group operations. Groups are created lazily on first message.

use chatsift_core::ChatsiftError;
use chatsift_core::types::{Group, GroupSummary};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::{fmt_ts, row_to_group};
use crate::database::{Database, map_tr_err};

/// Create the group if absent (lazy upsert) and return it.
///
/// Lazily created groups get the upstream default name and description.
pub async fn ensure_group(db: &Database, group_id: &str) -> Result<Group, ChatsiftError> {
    let group_id = group_id.to_string();
    let now = Utc::now();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO groups (id, name, description, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    group_id,
                    format!("群組 {group_id}"),
                    "自動建立的群組",
                    fmt_ts(now),
                ],
            )?;
            let group = conn.query_row(
                "SELECT id, name, description, created_at FROM groups WHERE id = ?1",
                params![group_id],
                row_to_group,
            )?;
            Ok(group)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a group with its message count.
pub async fn get_group_summary(
    db: &Database,
    group_id: &str,
) -> Result<Option<GroupSummary>, ChatsiftError> {
    let group_id = group_id.to_string();
    db.connection()
        .call(move |conn| {
            let summary = conn
                .query_row(
                    "SELECT g.id, g.name, g.description, g.created_at, COUNT(m.id)
                     FROM groups g
                     LEFT JOIN messages m ON m.group_id = g.id
                     WHERE g.id = ?1
                     GROUP BY g.id",
                    params![group_id],
                    |row| {
                        Ok(GroupSummary {
                            group: row_to_group(row)?,
                            message_count: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(summary)
        })
        .await
        .map_err(map_tr_err)
}

/// All groups with message counts, newest first.
pub async fn list_groups(db: &Database) -> Result<Vec<GroupSummary>, ChatsiftError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.name, g.description, g.created_at, COUNT(m.id)
                 FROM groups g
                 LEFT JOIN messages m ON m.group_id = g.id
                 GROUP BY g.id
                 ORDER BY g.created_at DESC, g.id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(GroupSummary {
                    group: row_to_group(row)?,
                    message_count: row.get(4)?,
                })
            })?;
            let mut groups = Vec::new();
            for row in rows {
                groups.push(row?);
            }
            Ok(groups)
        })
        .await
        .map_err(map_tr_err)
}
