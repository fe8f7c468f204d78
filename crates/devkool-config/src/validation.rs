// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::{ClassifierBackend, DevkoolConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &DevkoolConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.data_dir.trim().is_empty() {
        invalid("storage.data_dir must not be empty".to_string());
    }
    if config.storage.key_file.trim().is_empty() {
        invalid("storage.key_file must not be empty".to_string());
    }
    if config.storage.store_file.trim().is_empty() {
        invalid("storage.store_file must not be empty".to_string());
    }
    if config.storage.key_path() == config.storage.store_path() {
        invalid("storage.key_file and storage.store_file must point to different files".to_string());
    }

    if config.classifier.timeout_secs == 0 {
        invalid("classifier.timeout_secs must be at least 1".to_string());
    }
    if config.classifier.backend == ClassifierBackend::Remote {
        match config.classifier.endpoint.as_deref().map(str::trim) {
            None | Some("") => {
                invalid("classifier.endpoint is required when classifier.backend = \"remote\"".to_string())
            }
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                invalid(format!("classifier.endpoint `{url}` must be an http(s) URL"))
            }
            Some(_) => {}
        }
    }
    if config.classifier.backend != ClassifierBackend::Disabled
        && config.classifier.candidate_labels.iter().all(|l| l.trim().is_empty())
    {
        invalid("classifier.candidate_labels must contain at least one label".to_string());
    }

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
