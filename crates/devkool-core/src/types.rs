// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the vault, classifier, and CLI crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Category assigned when the classifier fails or is not confident enough.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Classifier confidence below which the returned label is discarded.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Unique, immutable identifier of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Generate a fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Output of a classifier call: a label and the classifier's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Category label proposed by the classifier.
    pub label: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Resolve the stored category, applying the hard confidence cutoff.
    ///
    /// Anything under [`CONFIDENCE_THRESHOLD`], a NaN confidence, or an empty
    /// label becomes [`UNCATEGORIZED`].
    pub fn resolved_category(&self) -> String {
        let confident = self.confidence >= CONFIDENCE_THRESHOLD;
        if !confident || self.label.trim().is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            self.label.clone()
        }
    }
}

/// Where the secret key material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Key file on disk.
    File,
    /// Base64 key in the process environment.
    Environment,
    /// No key exists yet.
    Missing,
}
