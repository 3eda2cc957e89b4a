// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message upsert and read operations.

use chatsift_core::ChatsiftError;
use chatsift_core::types::{ListFilter, ProcessedMessage, StoredMessage};
use chrono::Utc;
use rusqlite::{OptionalExtension, ToSql, params};

use super::{MESSAGE_COLUMNS, fmt_ts, row_to_message};
use crate::database::{Database, map_tr_err};

/// Insert a message or fully replace the row matching its `external_id`.
///
/// Last write wins on every mutable column; only `id` and `created_at`
/// survive from the first insert. The insert-then-select pair runs inside a
/// single `call` closure, so concurrent upserts of the same external id are
/// serialized by the writer thread and the stored row is always one complete
/// write.
pub async fn upsert_message(
    db: &Database,
    msg: ProcessedMessage,
) -> Result<StoredMessage, ChatsiftError> {
    let now = Utc::now();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (external_id, group_id, sender, content, summary, category,
                                       received_at, processed_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                 ON CONFLICT(external_id) DO UPDATE SET
                     group_id = excluded.group_id,
                     sender = excluded.sender,
                     content = excluded.content,
                     summary = excluded.summary,
                     category = excluded.category,
                     received_at = excluded.received_at,
                     processed_at = excluded.processed_at,
                     updated_at = excluded.updated_at",
                params![
                    msg.external_id,
                    msg.group_id,
                    msg.sender,
                    msg.text,
                    msg.summary,
                    msg.category.label(),
                    fmt_ts(msg.received_at),
                    fmt_ts(msg.processed_at),
                    fmt_ts(now),
                ],
            )?;
            let stored = conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE external_id = ?1"),
                params![msg.external_id],
                row_to_message,
            )?;
            Ok(stored)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a single message by external id.
pub async fn get_message(
    db: &Database,
    external_id: &str,
) -> Result<Option<StoredMessage>, ChatsiftError> {
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let msg = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE external_id = ?1"),
                    params![external_id],
                    row_to_message,
                )
                .optional()?;
            Ok(msg)
        })
        .await
        .map_err(map_tr_err)
}

/// List messages matching the filter, newest first.
///
/// The limit is clamped by `ListFilter::effective_limit`, so a caller
/// requesting 1000 rows gets at most the documented maximum.
pub async fn list_messages(
    db: &Database,
    filter: ListFilter,
) -> Result<Vec<StoredMessage>, ChatsiftError> {
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE 1=1");
            let category = filter.category.map(|c| c.label().to_string());
            let limit = filter.effective_limit();
            let offset = filter.effective_offset();

            let mut binds: Vec<&dyn ToSql> = Vec::new();
            if let Some(ref group_id) = filter.group_id {
                sql.push_str(" AND group_id = ?");
                binds.push(group_id);
            }
            if let Some(ref category) = category {
                sql.push_str(" AND category = ?");
                binds.push(category);
            }
            if let Some(ref sender) = filter.sender {
                sql.push_str(" AND sender = ?");
                binds.push(sender);
            }
            sql.push_str(" ORDER BY received_at DESC, id DESC LIMIT ? OFFSET ?");
            binds.push(&limit);
            binds.push(&offset);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(binds.as_slice(), row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
