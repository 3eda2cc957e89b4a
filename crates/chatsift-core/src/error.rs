// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the chatsift message pipeline.

use thiserror::Error;

/// The primary error type used across all chatsift crates.
#[derive(Debug, Error)]
pub enum ChatsiftError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A message failed validation at the source adapter boundary.
    ///
    /// Rejected immediately and never stored.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Remote annotator errors (API failure, out-of-vocabulary label, bad response).
    ///
    /// The pipeline absorbs these with the local fallback path; they never
    /// reach ingest callers as failures.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Gateway transport errors (bind failure, serve failure).
    #[error("gateway error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatsiftError {
    /// Builds a `Provider` error from a message with no underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a `Storage` error from any boxable error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
