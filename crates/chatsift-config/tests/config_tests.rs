// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system: layered loading,
//! validation, and diagnostic conversion.

use chatsift_config::{ConfigError, load_and_validate_str};

#[test]
fn full_config_parses_and_validates() {
    let config = load_and_validate_str(
        r#"
[service]
name = "chatsift-test"
log_level = "debug"

[anthropic]
model = "claude-haiku-4-5-20250901"
max_tokens = 128
timeout_secs = 3

[storage]
backend = "memory"

[gateway]
host = "0.0.0.0"
port = 8080
bearer_token = "test-token"

[pipeline]
summary_max_chars = 40
default_group_id = "g-default"
"#,
    )
    .expect("config should validate");

    assert_eq!(config.service.name, "chatsift-test");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.anthropic.max_tokens, 128);
    assert_eq!(config.anthropic.timeout_secs, 3);
    assert_eq!(config.storage.backend, "memory");
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("test-token"));
    assert_eq!(config.pipeline.summary_max_chars, 40);
    assert_eq!(config.pipeline.default_group_id, "g-default");
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.service.name, "chatsift");
    assert_eq!(config.storage.backend, "sqlite");
    assert!(config.anthropic.api_key.is_none());
    assert!(config.gateway.bearer_token.is_none());
    assert_eq!(config.pipeline.message_deadline_secs, 15);
}

#[test]
fn typo_in_key_produces_suggestion() {
    let errors = load_and_validate_str(
        r#"
[gateway]
bearer_tokn = "oops"
"#,
    )
    .unwrap_err();

    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "bearer_tokn" && suggestion.as_deref() == Some("bearer_token")
        )
    });
    assert!(found, "expected an UnknownKey error with a suggestion, got: {errors:?}");
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str(
        r#"
[gateway]
port = "not-a-number"
"#,
    )
    .unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))),
        "expected a type error, got: {errors:?}"
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str(
        r#"
[storage]
backend = "mongodb"
"#,
    )
    .unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("mongodb"))
    ));
}
