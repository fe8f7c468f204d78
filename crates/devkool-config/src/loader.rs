// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/devkool/devkool.toml`,
//! `~/.config/devkool/devkool.toml`, `./devkool.toml` (or an explicit path),
//! then `DEVKOOL_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DevkoolConfig;

/// Prefix for every environment override.
pub const ENV_PREFIX: &str = "DEVKOOL_";

/// Env var (prefix stripped, lowercased) that carries key material, not config.
const SECRET_KEY_ENV: &str = "secret_key";

/// Sections that may be overridden from the environment.
const ENV_SECTIONS: &[&str] = &["storage", "classifier", "log"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/devkool/devkool.toml";

/// Config file name looked up in the working directory and the XDG config dir.
pub const LOCAL_CONFIG_FILE: &str = "devkool.toml";

/// `~/.config/devkool/devkool.toml`, when a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("devkool").join(LOCAL_CONFIG_FILE))
}

/// Load from the standard hierarchy with env overrides.
pub fn load_config() -> Result<DevkoolConfig, figment::Error> {
    build_figment(None).extract()
}

/// Load with an explicit file in place of `./devkool.toml`.
pub fn load_config_from_path(path: &Path) -> Result<DevkoolConfig, figment::Error> {
    build_figment(Some(path)).extract()
}

/// Load defaults plus the given TOML string only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<DevkoolConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DevkoolConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment before extraction.
pub fn build_figment(explicit: Option<&Path>) -> Figment {
    let figment = Figment::new()
        .merge(Serialized::defaults(DevkoolConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()));

    let figment = match explicit {
        Some(path) => figment.merge(Toml::file(path)),
        None => figment.merge(Toml::file(LOCAL_CONFIG_FILE)),
    };

    figment.merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Maps `DEVKOOL_STORAGE_DATA_DIR` to `storage.data_dir` by splitting only on
/// the first underscore after a known section name, so key names keep their
/// own underscores. `DEVKOOL_SECRET_KEY` is not configuration and is skipped,
/// as is any variable outside the known sections (e.g. `DEVKOOL_HOME`).
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(&[SECRET_KEY_ENV])
        .filter(|key| section_key(key.as_str()).is_some())
        .map(|key| {
            section_key(key.as_str())
                .unwrap_or_else(|| key.as_str().to_ascii_lowercase())
                .into()
        })
}

/// `storage_data_dir` -> `storage.data_dir`; `None` outside known sections.
fn section_key(key: &str) -> Option<String> {
    let lower = key.to_ascii_lowercase();
    ENV_SECTIONS.iter().find_map(|section| {
        lower
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{section}.{rest}"))
    })
}
