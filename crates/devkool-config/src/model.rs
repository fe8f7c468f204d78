// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported instead of silently ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Labels offered to the classifier when none are configured.
pub const DEFAULT_CATEGORY_LABELS: &[&str] = &[
    "Finance",
    "Payments",
    "Weather",
    "Maps & Geolocation",
    "AI & Machine Learning",
    "Social Media",
    "Messaging",
    "Developer Tools",
    "Cloud Infrastructure",
    "E-commerce",
    "Media & Entertainment",
    "News",
];

/// Top-level devkool configuration. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DevkoolConfig {
    /// Where the key and record store live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Endpoint classifier backend.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

/// Locations of the key file and the record store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding both files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Key file name, or an absolute path.
    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// Record store file name, or an absolute path.
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

impl StorageConfig {
    /// Absolute or `data_dir`-relative path to the key file.
    pub fn key_path(&self) -> PathBuf {
        self.resolve(&self.key_file)
    }

    /// Absolute or `data_dir`-relative path to the record store.
    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.store_file)
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.data_dir).join(path)
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            key_file: default_key_file(),
            store_file: default_store_file(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("devkool"))
        .unwrap_or_else(|| PathBuf::from(".devkool"))
        .display()
        .to_string()
}

fn default_key_file() -> String {
    "secret.key".to_string()
}

fn default_store_file() -> String {
    "api_store.json".to_string()
}

/// Which classifier implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Offline keyword scoring.
    #[default]
    Heuristic,
    /// Zero-shot classification over HTTP.
    Remote,
    /// No classification; everything is `Uncategorized`.
    Disabled,
}

/// Endpoint classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,

    /// Zero-shot inference URL. Required for the `remote` backend.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent to the remote endpoint.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout for the remote backend.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Labels the classifier chooses from.
    #[serde(default = "default_candidate_labels")]
    pub candidate_labels: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            endpoint: None,
            api_token: None,
            timeout_secs: default_timeout_secs(),
            candidate_labels: default_candidate_labels(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_candidate_labels() -> Vec<String> {
    DEFAULT_CATEGORY_LABELS.iter().map(|s| s.to_string()).collect()
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for devkool's own targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_files_resolve_against_data_dir() {
        let storage = StorageConfig {
            data_dir: "/var/lib/devkool".to_string(),
            key_file: "secret.key".to_string(),
            store_file: "api_store.json".to_string(),
        };
        assert_eq!(storage.key_path(), PathBuf::from("/var/lib/devkool/secret.key"));
        assert_eq!(
            storage.store_path(),
            PathBuf::from("/var/lib/devkool/api_store.json")
        );
    }

    #[test]
    fn absolute_files_ignore_data_dir() {
        let storage = StorageConfig {
            data_dir: "/var/lib/devkool".to_string(),
            key_file: "/run/secrets/devkool.key".to_string(),
            store_file: "api_store.json".to_string(),
        };
        assert_eq!(storage.key_path(), PathBuf::from("/run/secrets/devkool.key"));
    }

    #[test]
    fn classifier_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.backend, ClassifierBackend::Heuristic);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.candidate_labels.len(), DEFAULT_CATEGORY_LABELS.len());
    }

    #[test]
    fn backend_parses_lowercase() {
        let config: ClassifierConfig = toml::from_str("backend = \"remote\"").unwrap();
        assert_eq!(config.backend, ClassifierBackend::Remote);
    }
}
