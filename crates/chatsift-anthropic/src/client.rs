// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Handles request construction, authentication headers, bounded timeouts,
//! and transient error retry.

use std::time::Duration;

use chatsift_core::ChatsiftError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::warn;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Base URL for the Anthropic Messages API.
const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Delay before retrying a transient failure.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// HTTP client for Anthropic API communication.
///
/// Manages authentication headers, connection pooling, and retry logic for
/// transient statuses (429, 5xx). The whole-request timeout comes from
/// configuration so a hung remote never stalls the pipeline past its budget.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    model: String,
    max_retries: u32,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    pub fn new(
        api_key: &str,
        api_version: &str,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ChatsiftError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| ChatsiftError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                ChatsiftError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ChatsiftError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends a completion request and returns the response.
    ///
    /// On transient statuses (429, 5xx), retries once after a short delay.
    pub async fn complete(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, ChatsiftError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying Anthropic request after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = match self.client.post(&self.base_url).json(request).send().await {
                Ok(response) => response,
                Err(e) => {
                    // Connection errors and client-side timeouts are transient.
                    last_error = Some(ChatsiftError::Provider {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<MessageResponse>()
                    .await
                    .map_err(|e| ChatsiftError::Provider {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    });
            }

            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            let error = ChatsiftError::provider(format!("API returned {status}: {detail}"));

            if is_transient(status) {
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error
            .unwrap_or_else(|| ChatsiftError::provider("request failed with no recorded error")))
    }
}

/// Statuses worth one retry: rate limiting and server-side failures.
fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
