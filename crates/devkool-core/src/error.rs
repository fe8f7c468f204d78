// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the devkool credential vault.

use std::path::PathBuf;

use thiserror::Error;

/// The error type shared by every devkool crate.
///
/// Each variant maps to one failure class of the vault. Callers decide per
/// call whether to propagate or downgrade: `Decryption` is isolated per record
/// during listing, `Classification` is always recovered into the
/// `"Uncategorized"` label, everything else aborts the current command.
#[derive(Debug, Error)]
pub enum DevkoolError {
    /// The secret key is missing, unreadable, or malformed.
    #[error("secret key unavailable: {0}")]
    KeyUnavailable(String),

    /// The endpoint failed URL syntax validation.
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A command argument other than the endpoint was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A sealed field could not be opened (malformed, wrong key, or tampered).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The record store could not be read or written.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No record exists with the given identifier.
    #[error("no record with id `{id}`")]
    NotFound { id: String },

    /// The classifier failed to produce a label.
    #[error("classification failed: {0}")]
    Classification(String),

    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected filesystem failure outside the store contract.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DevkoolError {
    /// Build a `Persistence` error carrying its underlying cause.
    pub fn persistence(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DevkoolError::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error is a per-record decryption failure.
    pub fn is_decryption(&self) -> bool {
        matches!(self, DevkoolError::Decryption(_))
    }

    /// Whether the error is a missing-record failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DevkoolError::NotFound { .. })
    }
}
