// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude remote annotator for chatsift.
//!
//! Implements [`Annotator`] over the Messages API: classification against
//! the fixed category menu and short-summary generation. Both methods
//! validate remote output before returning it — an out-of-vocabulary label
//! or empty summary is an error here, which the pipeline resolves with its
//! local fallback.

pub mod client;
pub mod types;

use async_trait::async_trait;
use chatsift_config::model::AnthropicConfig;
use chatsift_core::types::Category;
use chatsift_core::{Annotator, ChatsiftError};
use std::time::Duration;
use tracing::info;

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Sampling temperature for classification: near-deterministic.
const CLASSIFY_TEMPERATURE: f32 = 0.1;

/// Sampling temperature for summarization.
const SUMMARIZE_TEMPERATURE: f32 = 0.3;

/// Remote annotator backed by the Anthropic Messages API.
pub struct ClaudeAnnotator {
    client: AnthropicClient,
    max_tokens: u32,
}

impl ClaudeAnnotator {
    /// Builds the annotator from configuration, if credentials exist.
    ///
    /// API key resolution: `anthropic.api_key`, then the `ANTHROPIC_API_KEY`
    /// environment variable. `Ok(None)` when neither is set — running
    /// without remote annotation is a normal configuration state, not an
    /// error.
    pub fn from_config(config: &AnthropicConfig) -> Result<Option<Self>, ChatsiftError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        let Some(api_key) = api_key else {
            return Ok(None);
        };

        let client = AnthropicClient::new(
            &api_key,
            &config.api_version,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = config.model, "Anthropic annotator initialized");
        Ok(Some(Self {
            client,
            max_tokens: config.max_tokens,
        }))
    }

    /// Creates an annotator with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: AnthropicClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    fn request(&self, prompt: String, temperature: f32) -> MessageRequest {
        MessageRequest {
            model: self.client.model().to_string(),
            max_tokens: self.max_tokens,
            temperature: Some(temperature),
            messages: vec![ApiMessage::user(prompt)],
        }
    }
}

/// Prompt presenting the fixed category menu and asking for the bare label.
fn classification_prompt(text: &str) -> String {
    format!(
        "請將以下訊息分類到最適合的類別：\n\n\
         訊息：{text}\n\n\
         可選類別：\n\
         - 技術討論：程式開發、技術問題、代碼相關\n\
         - 工作相關：會議、專案、工作安排\n\
         - 生活分享：日常生活、休閒娛樂\n\
         - 問題求助：需要幫助的問題\n\
         - 活動通知：聚會、會議、活動\n\
         - 其他：不屬於上述類別\n\n\
         請只回傳類別名稱："
    )
}

/// Prompt asking for a summary within the original 50-character budget.
fn summary_prompt(text: &str, sender: &str) -> String {
    format!(
        "請為以下訊息生成簡潔的摘要（最多50字）：\n\n\
         用戶：{sender}\n\
         訊息：{text}\n\n\
         摘要："
    )
}

#[async_trait]
impl Annotator for ClaudeAnnotator {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn classify(&self, text: &str) -> Result<Category, ChatsiftError> {
        let request = self.request(classification_prompt(text), CLASSIFY_TEMPERATURE);
        let response = self.client.complete(&request).await?;
        let label = response.text();
        Category::parse_label(&label).ok_or_else(|| {
            ChatsiftError::provider(format!(
                "remote label `{}` is out of vocabulary",
                label.trim()
            ))
        })
    }

    async fn summarize(&self, text: &str, sender: &str) -> Result<String, ChatsiftError> {
        let request = self.request(summary_prompt(text, sender), SUMMARIZE_TEMPERATURE);
        let response = self.client.complete(&request).await?;
        let summary = response.text().trim().to_string();
        if summary.is_empty() {
            return Err(ChatsiftError::provider("remote summary was empty"));
        }
        Ok(summary)
    }
}
