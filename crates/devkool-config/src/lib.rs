// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the devkool credential vault.
//!
//! TOML files layered with `DEVKOOL_*` environment overrides, strict
//! `deny_unknown_fields` parsing, post-parse validation, and miette
//! diagnostics for anything that fails.
//!
//! ```no_run
//! let config = devkool_config::load_and_validate(None).expect("config errors");
//! println!("store: {}", config.storage.store_path().display());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use tracing::debug;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ClassifierBackend, ClassifierConfig, DevkoolConfig, LogConfig, StorageConfig};

/// Load from the standard hierarchy (or `explicit` in place of
/// `./devkool.toml`) and validate.
///
/// An explicit path that does not exist is an error; the standard locations
/// are optional.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<DevkoolConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) if !path.is_file() => {
            return Err(vec![ConfigError::Other(format!(
                "config file not found: {}",
                path.display()
            ))]);
        }
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            debug!(
                data_dir = %config.storage.data_dir,
                backend = ?config.classifier.backend,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(explicit),
        )),
    }
}

/// Parse and validate a TOML string on top of the defaults.
pub fn load_and_validate_str(toml_content: &str) -> Result<DevkoolConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every config file that exists, keyed the way Figment reports them.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let mut candidates = vec![Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf()];
    candidates.extend(loader::user_config_path());
    match explicit {
        Some(path) => candidates.push(path.to_path_buf()),
        None => candidates.push(Path::new(loader::LOCAL_CONFIG_FILE).to_path_buf()),
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let absolute = std::fs::canonicalize(&path).unwrap_or(path);
            Some((absolute.display().to_string(), content))
        })
        .collect()
}
