// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for service-level integration testing.
//!
//! `TestHarness` wires a [`VaultService`] to a temporary data directory and a
//! [`MockClassifier`]. The process environment is never consulted for the
//! key unless a test asks for it explicitly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use devkool_config::StorageConfig;
use devkool_core::{Classifier, DevkoolError};
use devkool_vault::{KeyManager, RecordStore, VaultService};
use tempfile::TempDir;

use crate::mock_classifier::MockClassifier;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    classifier: Option<Arc<dyn Classifier>>,
    env_key: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            classifier: None,
            env_key: None,
        }
    }

    /// Use `classifier` instead of the default mock.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Supply the key as if it came from `DEVKOOL_SECRET_KEY`.
    pub fn with_env_key(mut self, encoded: impl Into<String>) -> Self {
        self.env_key = Some(encoded.into());
        self
    }

    /// Build the harness, creating its temporary directory.
    pub fn build(self) -> Result<TestHarness, DevkoolError> {
        let temp_dir = TempDir::new().map_err(|source| DevkoolError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        let storage = StorageConfig {
            data_dir: temp_dir.path().display().to_string(),
            ..StorageConfig::default()
        };
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(MockClassifier::default()));

        Ok(TestHarness {
            storage,
            classifier,
            env_key: self.env_key,
            _temp_dir: temp_dir,
        })
    }
}

/// A vault rooted in a temporary directory, removed on drop.
pub struct TestHarness {
    storage: StorageConfig,
    classifier: Arc<dyn Classifier>,
    env_key: Option<String>,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with the default mock classifier.
    pub fn new() -> Result<Self, DevkoolError> {
        Self::builder().build()
    }

    /// A fresh service over the harness directory.
    ///
    /// Each call behaves like a new process: nothing is cached between
    /// services except what is on disk.
    pub fn service(&self) -> VaultService {
        self.service_with(self.classifier.clone())
    }

    /// A fresh service using a different classifier.
    pub fn service_with(&self, classifier: Arc<dyn Classifier>) -> VaultService {
        VaultService::new(self.keys(), self.store(), classifier)
    }

    pub fn keys(&self) -> KeyManager {
        KeyManager::from_config(&self.storage).with_env_key(self.env_key.clone())
    }

    pub fn store(&self) -> RecordStore {
        RecordStore::from_config(&self.storage)
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn data_dir(&self) -> &Path {
        Path::new(&self.storage.data_dir)
    }

    pub fn key_path(&self) -> PathBuf {
        self.storage.key_path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.storage.store_path()
    }
}
