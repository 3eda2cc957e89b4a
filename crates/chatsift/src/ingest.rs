// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatsift ingest` command implementation.
//!
//! Offline batch entry point: reads a JSON array of raw messages from a file
//! and runs each through the same pipeline the gateway uses, printing one
//! line per message.

use std::path::Path;

use chatsift_config::ChatsiftConfig;
use chatsift_core::ChatsiftError;
use chatsift_core::types::RawMessage;
use tracing::info;

use crate::serve::build_pipeline;

/// Runs the `chatsift ingest` command.
pub async fn run_ingest(
    config: ChatsiftConfig,
    file: &Path,
    group: Option<String>,
) -> Result<(), ChatsiftError> {
    let raws = read_messages(file, group.as_deref())?;
    info!(count = raws.len(), file = %file.display(), "ingesting batch");

    let pipeline = build_pipeline(&config).await?;
    let results = pipeline.process_batch(raws).await;

    let mut stored = 0usize;
    let mut failed = 0usize;
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(msg) => {
                stored += 1;
                println!(
                    "[{}] {} | {} | {}",
                    msg.category.label(),
                    msg.sender,
                    msg.summary,
                    msg.external_id
                );
            }
            Err(e) => {
                failed += 1;
                println!("message {index} rejected: {e}");
            }
        }
    }
    println!("{stored} stored, {failed} rejected");

    pipeline.store().close().await?;
    Ok(())
}

/// Parse the input file as a JSON array of raw messages, filling in the
/// group id for messages that carry none.
fn read_messages(file: &Path, group: Option<&str>) -> Result<Vec<RawMessage>, ChatsiftError> {
    let content = std::fs::read_to_string(file).map_err(|e| {
        ChatsiftError::InvalidMessage(format!("cannot read {}: {e}", file.display()))
    })?;
    let mut raws: Vec<RawMessage> = serde_json::from_str(&content).map_err(|e| {
        ChatsiftError::InvalidMessage(format!("{} is not a JSON message array: {e}", file.display()))
    })?;

    if let Some(group) = group {
        for raw in &mut raws {
            if raw.group_id.is_none() {
                raw.group_id = Some(group.to_string());
            }
        }
    }
    Ok(raws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_message_array_and_fills_group() {
        let file = write_temp(
            r#"[
                {"text": "有人知道怎麼解決這個 bug 嗎？", "sender": "張三"},
                {"text": "推薦一家好吃的餐廳", "group_id": "g2"}
            ]"#,
        );
        let raws = read_messages(file.path(), Some("g1")).unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(raws[0].group_id.as_deref(), Some("g1"));
        // Explicit group ids are preserved.
        assert_eq!(raws[1].group_id.as_deref(), Some("g2"));
    }

    #[test]
    fn rejects_non_array_input() {
        let file = write_temp(r#"{"text": "not an array"}"#);
        let err = read_messages(file.path(), None).unwrap_err();
        assert!(matches!(err, ChatsiftError::InvalidMessage(_)));
    }

    #[test]
    fn rejects_missing_file() {
        let err = read_messages(Path::new("/nonexistent/messages.json"), None).unwrap_err();
        assert!(matches!(err, ChatsiftError::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn ingest_runs_against_memory_backend() {
        let file = write_temp(r#"[{"text": "週五晚上有聚會", "sender": "a"}]"#);
        let config = chatsift_config::load_and_validate_str(
            "[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();
        run_ingest(config, file.path(), Some("g1".to_string())).await.unwrap();
    }
}
