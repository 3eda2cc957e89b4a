// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./chatsift.toml` > `~/.config/chatsift/chatsift.toml`
//! > `/etc/chatsift/chatsift.toml`, with environment variable overrides via
//! the `CHATSIFT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ChatsiftConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatsift/chatsift.toml` (system-wide)
/// 3. `~/.config/chatsift/chatsift.toml` (user XDG config)
/// 4. `./chatsift.toml` (local directory)
/// 5. `CHATSIFT_*` environment variables
pub fn load_config() -> Result<ChatsiftConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatsiftConfig::default()))
        .merge(Toml::file("/etc/chatsift/chatsift.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("chatsift/chatsift.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("chatsift.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file or env lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ChatsiftConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatsiftConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatsiftConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatsiftConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CHATSIFT_ANTHROPIC_API_KEY` must map to
/// `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("CHATSIFT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CHATSIFT_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("pipeline_", "pipeline.", 1);
        mapped.into()
    })
}
