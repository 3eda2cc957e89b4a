// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote annotator trait for external classification/summarization services.

use async_trait::async_trait;

use crate::error::ChatsiftError;
use crate::types::Category;

/// Optional remote text-annotation service (e.g. the Anthropic Messages API).
///
/// The pipeline treats every error from these methods as recoverable: it
/// falls back to the local rule table and truncation summarizer. An
/// implementation must therefore validate remote output itself — in
/// particular, `classify` returns a [`Category`] and never a raw label, so an
/// out-of-vocabulary response surfaces as an error here rather than leaking
/// to callers.
#[async_trait]
pub trait Annotator: Send + Sync + 'static {
    /// Human-readable service name for logs.
    fn name(&self) -> &str;

    /// Classifies `text` into one of the fixed categories.
    async fn classify(&self, text: &str) -> Result<Category, ChatsiftError>;

    /// Produces a short summary of `text`. `sender` is advisory context.
    async fn summarize(&self, text: &str, sender: &str) -> Result<String, ChatsiftError>;
}
