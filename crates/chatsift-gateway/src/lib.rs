// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway exposing the chatsift pipeline and store over REST.
//!
//! Routes:
//! - `GET  /health` — public liveness
//! - `POST /v1/messages` — ingest one raw message
//! - `GET  /v1/messages` — filtered, paginated listing across groups
//! - `GET  /v1/stats` — dashboard overview
//! - `GET  /v1/groups` — groups with message counts
//! - `GET  /v1/groups/{group_id}` — single group
//! - `POST /v1/groups/{group_id}/messages` — batch ingest into a group
//! - `GET  /v1/groups/{group_id}/messages` — group listing
//! - `GET  /v1/groups/{group_id}/stats` — per-group aggregates

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{AppState, build_router, start_server};
