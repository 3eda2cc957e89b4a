// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Ingest handlers push raw messages through the pipeline; read handlers go
//! straight to the store. Error mapping: `InvalidMessage` -> 400,
//! `Timeout` -> 504, everything else -> 500. Remote annotator failures never
//! surface here — the pipeline absorbs them.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatsift_core::ChatsiftError;
use chatsift_core::types::{
    Category, CategoryCount, GroupSummary, ListFilter, RawMessage, StoredMessage,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::AppState;

/// A processed message as returned by ingest and listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Server-assigned storage id.
    pub storage_id: String,
    pub external_id: String,
    pub group_id: String,
    pub sender: String,
    pub text: String,
    pub summary: String,
    pub category: Category,
    pub received_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
}

impl From<StoredMessage> for MessageResponse {
    fn from(msg: StoredMessage) -> Self {
        Self {
            storage_id: msg.id.to_string(),
            external_id: msg.external_id,
            group_id: msg.group_id,
            sender: msg.sender,
            text: msg.text,
            summary: msg.summary,
            category: msg.category,
            received_at: msg.received_at,
            processed_at: msg.processed_at,
        }
    }
}

/// Request body for `POST /v1/groups/{group_id}/messages`.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub messages: Vec<RawMessage>,
}

/// One rejected message in a batch.
#[derive(Debug, Serialize)]
pub struct BatchFailure {
    /// Index into the submitted array.
    pub index: usize,
    pub error: String,
}

/// Response body for batch ingestion.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub processed: Vec<MessageResponse>,
    pub failed: Vec<BatchFailure>,
    pub total: usize,
}

/// Query parameters for message listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Response body for message listings.
#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
    pub count: usize,
}

/// Response body for `GET /v1/groups`.
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<GroupSummary>,
    pub count: usize,
}

/// Response body for `GET /v1/groups/{group_id}/stats`.
#[derive(Debug, Serialize)]
pub struct GroupStatsResponse {
    pub group_id: String,
    pub total_messages: i64,
    pub unique_senders: i64,
    pub categories: Vec<CategoryCount>,
    pub recent: Vec<MessageResponse>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub store: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper mapping pipeline/store errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(ChatsiftError);

impl From<ChatsiftError> for ApiError {
    fn from(err: ChatsiftError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ChatsiftError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            ChatsiftError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError(ChatsiftError::InvalidMessage(message.into()))
}

fn parse_category_param(value: Option<&str>) -> Result<Option<Category>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => Category::parse_label(raw).map(Some).ok_or_else(|| {
            let valid = Category::ALL.map(|c| c.label()).join(", ");
            bad_request(format!("unknown category `{raw}`; valid categories: {valid}"))
        }),
    }
}

fn to_filter(query: ListQuery) -> Result<ListFilter, ApiError> {
    Ok(ListFilter {
        category: parse_category_param(query.category.as_deref())?,
        group_id: query.group_id,
        sender: query.sender,
        limit: query.limit,
        offset: query.offset,
    })
}

/// POST /v1/messages
///
/// Processes one raw message through the pipeline and returns the fully
/// processed record. The caller gets either a complete record or an error,
/// never a partially processed state.
pub async fn post_message(
    State(state): State<AppState>,
    Json(raw): Json<RawMessage>,
) -> Result<Json<MessageResponse>, ApiError> {
    let stored = state.pipeline.process(raw).await?;
    Ok(Json(stored.into()))
}

/// GET /v1/messages
///
/// Paginated listing across all groups, newest first, with optional
/// group/category/sender filters.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let filter = to_filter(query)?;
    let messages = state.store.list(filter).await?;
    let messages: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(Json(MessageListResponse {
        count: messages.len(),
        messages,
    }))
}

/// GET /v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<GroupListResponse>, ApiError> {
    let groups = state.store.list_groups().await?;
    Ok(Json(GroupListResponse {
        count: groups.len(),
        groups,
    }))
}

/// GET /v1/groups/{group_id}
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupSummary>, Response> {
    match state.store.get_group(&group_id).await {
        Ok(Some(group)) => Ok(Json(group)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("group `{group_id}` not found"),
            }),
        )
            .into_response()),
        Err(e) => Err(ApiError(e).into_response()),
    }
}

/// POST /v1/groups/{group_id}/messages
///
/// Batch ingestion into one group. The path group id fills in messages that
/// carry none; messages naming a different group keep their own. Individual
/// failures do not abort the batch.
pub async fn post_group_messages(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    if body.messages.is_empty() {
        return Err(bad_request("messages array is empty"));
    }

    let raws: Vec<RawMessage> = body
        .messages
        .into_iter()
        .map(|mut raw| {
            if raw.group_id.is_none() {
                raw.group_id = Some(group_id.clone());
            }
            raw
        })
        .collect();
    let total = raws.len();

    let mut processed = Vec::new();
    let mut failed = Vec::new();
    for (index, result) in state.pipeline.process_batch(raws).await.into_iter().enumerate() {
        match result {
            Ok(stored) => processed.push(stored.into()),
            Err(e) => failed.push(BatchFailure {
                index,
                error: e.to_string(),
            }),
        }
    }

    Ok(Json(BatchResponse {
        processed,
        failed,
        total,
    }))
}

/// GET /v1/groups/{group_id}/messages
pub async fn list_group_messages(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let mut filter = to_filter(query)?;
    filter.group_id = Some(group_id);
    let messages = state.store.list(filter).await?;
    let messages: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(Json(MessageListResponse {
        count: messages.len(),
        messages,
    }))
}

/// GET /v1/groups/{group_id}/stats
pub async fn get_group_stats(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupStatsResponse>, ApiError> {
    let stats = state.store.group_stats(&group_id).await?;
    Ok(Json(GroupStatsResponse {
        group_id,
        total_messages: stats.total_messages,
        unique_senders: stats.unique_senders,
        categories: stats.categories,
        recent: stats.recent.into_iter().map(Into::into).collect(),
    }))
}

/// GET /v1/stats
///
/// Dashboard overview across all groups.
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<chatsift_core::types::Overview>, ApiError> {
    Ok(Json(state.store.overview().await?))
}

/// GET /health
///
/// Public liveness endpoint.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        store: state.store.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_message_body_deserializes_with_only_text() {
        let raw: RawMessage =
            serde_json::from_str(r#"{"text": "有人知道怎麼解決這個 bug 嗎？"}"#).unwrap();
        assert_eq!(raw.text, "有人知道怎麼解決這個 bug 嗎？");
        assert!(raw.group_id.is_none());
    }

    #[test]
    fn batch_request_deserializes() {
        let body: BatchRequest = serde_json::from_str(
            r#"{"messages": [
                {"text": "a", "sender": "張三"},
                {"text": "b", "timestamp": "2026-08-01T00:00:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].sender.as_deref(), Some("張三"));
    }

    #[test]
    fn category_param_parses_valid_label() {
        let parsed = parse_category_param(Some("技術討論")).unwrap();
        assert_eq!(parsed, Some(Category::TechTalk));
    }

    #[test]
    fn category_param_rejects_unknown_label() {
        assert!(parse_category_param(Some("nonsense")).is_err());
    }

    #[test]
    fn message_response_serializes_category_label() {
        let resp = MessageResponse {
            storage_id: "7".to_string(),
            external_id: "m1".to_string(),
            group_id: "g1".to_string(),
            sender: "張三".to_string(),
            text: "推薦一家好吃的餐廳".to_string(),
            summary: "推薦一家好吃的餐廳".to_string(),
            category: Category::Life,
            received_at: Utc::now(),
            processed_at: Utc::now(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"category\":\"生活分享\""));
        assert!(json.contains("\"storage_id\":\"7\""));
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "invalid message: text is empty after trimming".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("text is empty"));
    }
}
