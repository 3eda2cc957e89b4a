// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source adapter: normalizes raw messages from any origin into a canonical
//! draft.
//!
//! Origins differ in what they can provide — scraped DOM messages often lack
//! stable ids and carry approximate timestamps, webhook payloads have both,
//! manual API calls may have neither. Normalization is a pure transformation
//! with no side effects.

use chatsift_core::ChatsiftError;
use chatsift_core::types::{MessageDraft, RawMessage, UNKNOWN_SENDER};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Separator between digest fields. A control character so that field
/// contents cannot collide with the separator.
const ID_FIELD_SEP: char = '\u{1f}';

/// Number of hex digits kept from the digest for synthesized ids.
const ID_HEX_LEN: usize = 16;

/// Normalize a raw message into a canonical draft.
///
/// Validation: `text` must be non-empty after trimming, otherwise the
/// message is rejected with [`ChatsiftError::InvalidMessage`] — never
/// silently dropped and never stored.
///
/// Defaults: a missing sender becomes `"Unknown"`, a missing group id the
/// configured sentinel, and a missing or unparseable timestamp the supplied
/// `now` (scraped relative timestamps are best effort).
pub fn normalize(
    raw: RawMessage,
    default_group_id: &str,
    now: DateTime<Utc>,
) -> Result<MessageDraft, ChatsiftError> {
    let text = raw.text.trim();
    if text.is_empty() {
        return Err(ChatsiftError::InvalidMessage(
            "text is empty after trimming".to_string(),
        ));
    }

    let group_id = raw
        .group_id
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(default_group_id)
        .to_string();

    let sender = raw
        .sender
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SENDER)
        .to_string();

    let received_at = raw
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    let external_id = match raw.id.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
        Some(id) => id.to_string(),
        None => synthesize_external_id(&group_id, &sender, text, received_at),
    };

    Ok(MessageDraft {
        external_id,
        group_id,
        sender,
        text: text.to_string(),
        received_at,
    })
}

/// Synthesize a deterministic external id from the message content.
///
/// Derived from `(group_id, sender, text, received_at)` so a retried
/// submission of the same message maps to the same id and hits the upsert
/// path instead of inserting a duplicate. Never derived from the wall clock
/// alone.
pub fn synthesize_external_id(
    group_id: &str,
    sender: &str,
    text: &str,
    received_at: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    for field in [group_id, sender, text, &received_at.to_rfc3339()] {
        hasher.update(field.as_bytes());
        hasher.update([ID_FIELD_SEP as u8]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("gen-{}", &digest[..ID_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn raw(text: &str) -> RawMessage {
        RawMessage {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = normalize(raw(""), "default", at(0)).unwrap_err();
        assert!(matches!(err, ChatsiftError::InvalidMessage(_)));
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let err = normalize(raw("   \n\t "), "default", at(0)).unwrap_err();
        assert!(matches!(err, ChatsiftError::InvalidMessage(_)));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let draft = normalize(raw("hello"), "default", at(100)).unwrap();
        assert_eq!(draft.group_id, "default");
        assert_eq!(draft.sender, "Unknown");
        assert_eq!(draft.received_at, at(100));
        assert!(draft.external_id.starts_with("gen-"));
    }

    #[test]
    fn provided_id_is_used_verbatim() {
        let mut r = raw("hello");
        r.id = Some("fb-msg-42".to_string());
        let draft = normalize(r, "default", at(0)).unwrap();
        assert_eq!(draft.external_id, "fb-msg-42");
    }

    #[test]
    fn synthesized_id_is_deterministic() {
        let make = || {
            let mut r = raw("有人知道怎麼解決這個 bug 嗎？");
            r.group_id = Some("g1".to_string());
            r.sender = Some("張三".to_string());
            r.timestamp = Some("2026-08-01T12:00:00Z".to_string());
            normalize(r, "default", at(0)).unwrap()
        };
        // A retried submission maps to the same id.
        assert_eq!(make().external_id, make().external_id);
    }

    #[test]
    fn synthesized_id_differs_per_content() {
        let d1 = normalize(raw("first"), "default", at(5)).unwrap();
        let d2 = normalize(raw("second"), "default", at(5)).unwrap();
        assert_ne!(d1.external_id, d2.external_id);
    }

    #[test]
    fn timestamp_is_parsed_as_rfc3339() {
        let mut r = raw("hi");
        r.timestamp = Some("2026-08-01T09:30:00+08:00".to_string());
        let draft = normalize(r, "default", at(0)).unwrap();
        assert_eq!(draft.received_at.to_rfc3339(), "2026-08-01T01:30:00+00:00");
    }

    #[test]
    fn bad_timestamp_falls_back_to_now() {
        let mut r = raw("hi");
        r.timestamp = Some("3:49 PM".to_string());
        let draft = normalize(r, "default", at(77)).unwrap();
        assert_eq!(draft.received_at, at(77));
    }

    #[test]
    fn text_is_trimmed_in_draft() {
        let draft = normalize(raw("  訊息內容  "), "default", at(0)).unwrap();
        assert_eq!(draft.text, "訊息內容");
    }
}
