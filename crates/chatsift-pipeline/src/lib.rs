// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message ingestion and categorization pipeline.
//!
//! Orchestrates one message's path from raw input to stored row:
//! normalize -> {classify, summarize} -> upsert. Classification and
//! summarization run concurrently with no ordering dependency. When a remote
//! annotator is configured it is attempted first under a bounded timeout;
//! any failure — timeout, transport error, out-of-vocabulary label — falls
//! back to the local rule table and truncation summarizer and is never
//! surfaced to the caller. Only storage failures propagate.

pub mod adapter;
pub mod classifier;
pub mod summarizer;

use std::sync::Arc;
use std::time::Duration;

use chatsift_config::model::PipelineConfig;
use chatsift_core::types::{Category, ProcessedMessage, RawMessage, StoredMessage};
use chatsift_core::{Annotator, ChatsiftError, MessageStore};
use chrono::Utc;
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

/// The message processing pipeline.
///
/// One instance is shared by all ingest paths (gateway handlers, the batch
/// CLI). Messages are independent: callers may invoke `process` concurrently
/// with no ordering guarantee between distinct external ids; for the same
/// external id the store's upsert serializes the final write.
pub struct Pipeline {
    store: Arc<dyn MessageStore>,
    annotator: Option<Arc<dyn Annotator>>,
    remote_timeout: Duration,
    summary_max_chars: usize,
    default_group_id: String,
    message_deadline: Duration,
}

impl Pipeline {
    /// Create a pipeline over a store, with an optional remote annotator.
    ///
    /// `remote_timeout` bounds each individual remote call; the per-message
    /// deadline from `config` bounds the whole pipeline.
    pub fn new(
        store: Arc<dyn MessageStore>,
        annotator: Option<Arc<dyn Annotator>>,
        config: &PipelineConfig,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            store,
            annotator,
            remote_timeout,
            summary_max_chars: config.summary_max_chars,
            default_group_id: config.default_group_id.clone(),
            message_deadline: Duration::from_secs(config.message_deadline_secs),
        }
    }

    /// The store this pipeline writes to. Read paths go through this handle.
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Process one raw message under the configured per-message deadline.
    pub async fn process(&self, raw: RawMessage) -> Result<StoredMessage, ChatsiftError> {
        let deadline = Instant::now() + self.message_deadline;
        self.process_with_deadline(raw, deadline).await
    }

    /// Process one raw message, aborting remote calls once `deadline` passes.
    ///
    /// A passed deadline degrades to the local annotation path rather than
    /// failing: the caller still gets a fully processed record. `category`
    /// and `summary` are both computed before the single upsert, so no
    /// partially processed state is ever stored.
    pub async fn process_with_deadline(
        &self,
        raw: RawMessage,
        deadline: Instant,
    ) -> Result<StoredMessage, ChatsiftError> {
        let draft = adapter::normalize(raw, &self.default_group_id, Utc::now())?;

        let (category, summary) = tokio::join!(
            self.classify(&draft.text, deadline),
            self.summarize(&draft.text, &draft.sender, deadline),
        );

        debug!(
            external_id = draft.external_id.as_str(),
            group_id = draft.group_id.as_str(),
            category = category.label(),
            "message processed"
        );

        let processed = ProcessedMessage::from_draft(draft, summary, category, Utc::now());
        self.store.upsert(processed).await
    }

    /// Process a batch of raw messages concurrently.
    ///
    /// Results are returned in input order; individual failures (invalid
    /// messages, storage errors) do not abort the rest of the batch.
    pub async fn process_batch(
        &self,
        raws: Vec<RawMessage>,
    ) -> Vec<Result<StoredMessage, ChatsiftError>> {
        futures::future::join_all(raws.into_iter().map(|raw| self.process(raw))).await
    }

    /// Classify text, preferring the remote annotator when one is configured
    /// and deadline budget remains.
    async fn classify(&self, text: &str, deadline: Instant) -> Category {
        if let Some(annotator) = &self.annotator
            && let Some(budget) = self.remote_budget(deadline)
        {
            match timeout(budget, annotator.classify(text)).await {
                Ok(Ok(category)) => return category,
                Ok(Err(e)) => {
                    warn!(
                        annotator = annotator.name(),
                        error = %e,
                        "remote classification failed, using keyword rules"
                    );
                }
                Err(_) => {
                    warn!(
                        annotator = annotator.name(),
                        timeout_ms = budget.as_millis() as u64,
                        "remote classification timed out, using keyword rules"
                    );
                }
            }
        }
        classifier::classify(text)
    }

    /// Summarize text with the same fallback contract as `classify`.
    async fn summarize(&self, text: &str, sender: &str, deadline: Instant) -> String {
        if let Some(annotator) = &self.annotator
            && let Some(budget) = self.remote_budget(deadline)
        {
            match timeout(budget, annotator.summarize(text, sender)).await {
                Ok(Ok(summary)) if !summary.trim().is_empty() => return summary.trim().to_string(),
                Ok(Ok(_)) => {
                    warn!(
                        annotator = annotator.name(),
                        "remote summary was empty, using truncation"
                    );
                }
                Ok(Err(e)) => {
                    warn!(
                        annotator = annotator.name(),
                        error = %e,
                        "remote summarization failed, using truncation"
                    );
                }
                Err(_) => {
                    warn!(
                        annotator = annotator.name(),
                        timeout_ms = budget.as_millis() as u64,
                        "remote summarization timed out, using truncation"
                    );
                }
            }
        }
        summarizer::summarize(text, self.summary_max_chars)
    }

    /// Time available for one remote call: the configured per-call timeout,
    /// capped by what remains of the per-message deadline. `None` when the
    /// deadline has already passed.
    fn remote_budget(&self, deadline: Instant) -> Option<Duration> {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        if remaining.is_zero() {
            return None;
        }
        Some(self.remote_timeout.min(remaining))
    }
}
