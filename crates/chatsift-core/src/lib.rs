// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the chatsift message pipeline.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the chatsift workspace. Backend crates
//! (storage, the Anthropic annotator) implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ChatsiftError;
pub use traits::{Annotator, MessageStore};
pub use types::{
    Category, CategoryCount, Group, GroupStats, GroupSummary, ListFilter, MessageDraft, Overview,
    ProcessedMessage, RawMessage, StoredMessage,
};
