// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as known backend names, valid bind addresses, and
//! positive timeouts.

use crate::diagnostic::ConfigError;
use crate::model::ChatsiftConfig;

const KNOWN_BACKENDS: &[&str] = &["sqlite", "memory"];
const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatsiftConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.service.log_level.trim();
    if !KNOWN_LOG_LEVELS.contains(&level) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{level}` is not one of: {}",
                KNOWN_LOG_LEVELS.join(", ")
            ),
        });
    }

    let backend = config.storage.backend.trim();
    if !KNOWN_BACKENDS.contains(&backend) {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.backend `{backend}` is not one of: {}",
                KNOWN_BACKENDS.join(", ")
            ),
        });
    }

    if backend == "sqlite" && config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty for the sqlite backend".to_string(),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if let Some(ref token) = config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "gateway.bearer_token must not be blank; omit the key to disable auth"
                .to_string(),
        });
    }

    if config.anthropic.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.timeout_secs must be positive".to_string(),
        });
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.max_tokens must be positive".to_string(),
        });
    }

    if config.pipeline.summary_max_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.summary_max_chars must be positive".to_string(),
        });
    }

    if config.pipeline.default_group_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "pipeline.default_group_id must not be empty".to_string(),
        });
    }

    if config.pipeline.message_deadline_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.message_deadline_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
