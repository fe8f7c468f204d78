// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations over the encrypted record store.
//!
//! Each operation is one read-modify-write cycle: load the collection, apply
//! the change in memory, persist the whole collection. Validation and sealing
//! happen before anything is written, so a failed command leaves the store as
//! it was.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use devkool_config::StorageConfig;
use devkool_core::{Classifier, DevkoolError, KeySource, RecordId, UNCATEGORIZED};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::endpoint::validate_endpoint;
use crate::envelope::Envelope;
use crate::keys::KeyManager;
use crate::store::{Record, RecordCollection, RecordStore, StoreHealth, StoreSnapshot};

/// A decrypted record.
#[derive(Debug)]
pub struct Credential {
    pub id: RecordId,
    pub api_key: SecretString,
    pub endpoint: String,
    pub category: String,
}

/// A record that could not be opened during a listing.
#[derive(Debug)]
pub struct RecordFailure {
    pub id: RecordId,
    pub error: DevkoolError,
}

/// Outcome of [`VaultService::list`].
#[derive(Debug, Default)]
pub struct ListReport {
    pub credentials: Vec<Credential>,
    pub failures: Vec<RecordFailure>,
    /// Set when the store itself could not be read cleanly.
    pub store_problem: Option<DevkoolError>,
}

/// Outcome of a successful [`VaultService::add`].
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub id: RecordId,
    pub category: String,
    /// Where a malformed store was moved before this write, if it was.
    pub preserved_corrupt: Option<PathBuf>,
}

/// Outcome of a successful [`VaultService::update`].
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub id: RecordId,
    pub category: String,
    pub api_key_changed: bool,
    pub endpoint_changed: bool,
}

/// Snapshot of key and store state for `devkool status`.
#[derive(Debug)]
pub struct StatusReport {
    pub key_source: KeySource,
    pub key_path: PathBuf,
    pub store_path: PathBuf,
    pub store_health: StoreHealth,
    pub record_count: usize,
    pub store_problem: Option<DevkoolError>,
}

/// Orchestrates validation, sealing, classification, and persistence.
pub struct VaultService {
    keys: KeyManager,
    store: RecordStore,
    classifier: Arc<dyn Classifier>,
    envelope: OnceLock<Envelope>,
}

impl std::fmt::Debug for VaultService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultService")
            .field("keys", &self.keys)
            .field("store", &self.store)
            .field("classifier", &self.classifier.name())
            .finish_non_exhaustive()
    }
}

impl VaultService {
    pub fn new(keys: KeyManager, store: RecordStore, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            keys,
            store,
            classifier,
            envelope: OnceLock::new(),
        }
    }

    /// Service over the key and store locations named in `storage`.
    pub fn from_config(storage: &StorageConfig, classifier: Arc<dyn Classifier>) -> Self {
        Self::new(
            KeyManager::from_config(storage),
            RecordStore::from_config(storage),
            classifier,
        )
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Store a new credential and return its id and category.
    pub async fn add(&self, api_key: &str, endpoint: &str) -> Result<AddOutcome, DevkoolError> {
        validate_api_key(api_key)?;
        validate_endpoint(endpoint)?;

        let snapshot = self.load_for_write()?;
        let envelope = self.envelope(&snapshot.records)?;

        let sealed_key = envelope.seal(api_key)?;
        let sealed_endpoint = envelope.seal(endpoint)?;
        let category = self.categorize(endpoint).await;

        let id = RecordId::generate();
        let mut records = snapshot.records;
        records.insert(
            id.clone(),
            Record {
                api_key: sealed_key,
                endpoint: sealed_endpoint,
                category: category.clone(),
            },
        );

        let preserved_corrupt = self.persist(&records, snapshot.health)?;
        info!(id = %id, category = %category, "credential added");
        Ok(AddOutcome {
            id,
            category,
            preserved_corrupt,
        })
    }

    /// Decrypt every record. A record that fails to open is reported in
    /// `failures` and the listing continues.
    pub fn list(&self) -> Result<ListReport, DevkoolError> {
        let snapshot = self.store.load();
        let mut report = ListReport {
            store_problem: snapshot.problem,
            ..ListReport::default()
        };
        if snapshot.records.is_empty() {
            return Ok(report);
        }

        let envelope = self.envelope(&snapshot.records)?;
        for (id, record) in snapshot.records.iter() {
            match open_record(envelope, id, record) {
                Ok(credential) => report.credentials.push(credential),
                Err(error) => {
                    warn!(id = %id, error = %error, "skipping record that failed to decrypt");
                    report.failures.push(RecordFailure {
                        id: id.clone(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Decrypt a single record.
    pub fn show(&self, id: &RecordId) -> Result<Credential, DevkoolError> {
        let snapshot = self.store.load();
        let record = snapshot
            .records
            .get(id)
            .ok_or_else(|| not_found(id))?;
        let envelope = self.envelope(&snapshot.records)?;
        open_record(envelope, id, record)
    }

    /// Replace the api key and/or endpoint of an existing record.
    ///
    /// Fields left as `None` keep their sealed value. The id is checked
    /// before the new values. The category is recomputed only when the new
    /// endpoint differs from the stored one; a stored endpoint that cannot be
    /// opened counts as different.
    pub async fn update(
        &self,
        id: &RecordId,
        new_api_key: Option<&str>,
        new_endpoint: Option<&str>,
    ) -> Result<UpdateOutcome, DevkoolError> {
        if new_api_key.is_none() && new_endpoint.is_none() {
            return Err(DevkoolError::InvalidInput(
                "nothing to update: give a new api key and/or a new endpoint".to_string(),
            ));
        }

        let snapshot = self.load_for_write()?;
        let Some(existing) = snapshot.records.get(id) else {
            return Err(not_found(id));
        };
        if let Some(api_key) = new_api_key {
            validate_api_key(api_key)?;
        }
        if let Some(endpoint) = new_endpoint {
            validate_endpoint(endpoint)?;
        }
        let envelope = self.envelope(&snapshot.records)?;

        let mut updated = existing.clone();
        if let Some(api_key) = new_api_key {
            updated.api_key = envelope.seal(api_key)?;
        }
        let endpoint_changed = match new_endpoint {
            Some(endpoint) => match envelope.open(&existing.endpoint) {
                Ok(current) if current == endpoint => {
                    debug!(id = %id, "endpoint unchanged; keeping category");
                    false
                }
                _ => {
                    updated.endpoint = envelope.seal(endpoint)?;
                    updated.category = self.categorize(endpoint).await;
                    true
                }
            },
            None => false,
        };

        let category = updated.category.clone();
        let mut records = snapshot.records;
        records.insert(id.clone(), updated);
        self.persist(&records, snapshot.health)?;

        info!(id = %id, "credential updated");
        Ok(UpdateOutcome {
            id: id.clone(),
            category,
            api_key_changed: new_api_key.is_some(),
            endpoint_changed,
        })
    }

    /// Remove a record.
    pub fn delete(&self, id: &RecordId) -> Result<(), DevkoolError> {
        let snapshot = self.load_for_write()?;
        let mut records = snapshot.records;
        if records.remove(id).is_none() {
            return Err(not_found(id));
        }
        self.persist(&records, snapshot.health)?;
        info!(id = %id, "credential deleted");
        Ok(())
    }

    /// Report key and store state without creating anything.
    pub fn status(&self) -> StatusReport {
        let snapshot = self.store.load();
        StatusReport {
            key_source: self.keys.source(),
            key_path: self.keys.key_path().to_path_buf(),
            store_path: self.store.path().to_path_buf(),
            store_health: snapshot.health,
            record_count: snapshot.records.len(),
            store_problem: snapshot.problem,
        }
    }

    /// Load for a mutation. An unreadable store must not be overwritten, so
    /// it aborts the command; a malformed one is preserved at save time.
    fn load_for_write(&self) -> Result<StoreSnapshot, DevkoolError> {
        let snapshot = self.store.load();
        if snapshot.health == StoreHealth::Unreadable {
            return Err(snapshot.problem.unwrap_or_else(|| DevkoolError::Persistence {
                message: format!("cannot read {}", self.store.path().display()),
                source: None,
            }));
        }
        Ok(snapshot)
    }

    fn persist(
        &self,
        records: &RecordCollection,
        health: StoreHealth,
    ) -> Result<Option<PathBuf>, DevkoolError> {
        let preserved = if health == StoreHealth::Malformed {
            Some(self.store.preserve_corrupt()?)
        } else {
            None
        };
        self.store.save(records)?;
        Ok(preserved)
    }

    /// The process-wide envelope, created on first use.
    ///
    /// A key is only generated while the store holds no records; with records
    /// present a missing key is fatal, since a fresh key could never open them.
    fn envelope(&self, records: &RecordCollection) -> Result<&Envelope, DevkoolError> {
        if let Some(envelope) = self.envelope.get() {
            return Ok(envelope);
        }
        if records.is_empty() {
            self.keys.ensure_key()?;
        }
        let envelope = Envelope::new(self.keys.load_key()?);
        Ok(self.envelope.get_or_init(|| envelope))
    }

    /// Classify an endpoint, falling back to [`UNCATEGORIZED`] on failure or
    /// low confidence.
    async fn categorize(&self, endpoint: &str) -> String {
        match self.classifier.classify(endpoint).await {
            Ok(classification) => {
                let category = classification.resolved_category();
                debug!(
                    classifier = self.classifier.name(),
                    label = %classification.label,
                    confidence = classification.confidence,
                    category = %category,
                    "endpoint classified"
                );
                category
            }
            Err(e) => {
                warn!(classifier = self.classifier.name(), error = %e, "classification failed; using {UNCATEGORIZED}");
                UNCATEGORIZED.to_string()
            }
        }
    }
}

fn open_record(
    envelope: &Envelope,
    id: &RecordId,
    record: &Record,
) -> Result<Credential, DevkoolError> {
    Ok(Credential {
        id: id.clone(),
        api_key: SecretString::from(envelope.open(&record.api_key)?),
        endpoint: envelope.open(&record.endpoint)?,
        category: record.category.clone(),
    })
}

fn validate_api_key(api_key: &str) -> Result<(), DevkoolError> {
    if api_key.trim().is_empty() {
        return Err(DevkoolError::InvalidInput("api key must not be empty".to_string()));
    }
    Ok(())
}

fn not_found(id: &RecordId) -> DevkoolError {
    DevkoolError::NotFound { id: id.to_string() }
}

/// Mask a secret for display: `"sk-l...xyz9"`.
///
/// Shows up to four leading and four trailing characters. Values shorter than
/// ten characters are fully masked as `"****"`.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devkool_core::Classification;
    use tracing_test::traced_test;

    struct Unreachable;

    #[async_trait]
    impl Classifier for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn classify(&self, _text: &str) -> Result<Classification, DevkoolError> {
            Err(DevkoolError::Classification("connection refused".to_string()))
        }
    }

    fn service_in(dir: &std::path::Path) -> VaultService {
        VaultService::new(
            KeyManager::new(dir.join("secret.key")).with_env_key(None),
            RecordStore::new(dir.join("api_store.json")),
            Arc::new(Unreachable),
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn classifier_failure_is_logged_and_uncategorized() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = service_in(dir.path())
            .add("k1", "https://api.example.com")
            .await
            .unwrap();
        assert_eq!(outcome.category, UNCATEGORIZED);
        assert!(logs_contain("classification failed"));
        assert!(logs_contain("connection refused"));
    }

    #[test]
    fn debug_names_classifier_only() {
        let dir = tempfile::tempdir().unwrap();
        let rendered = format!("{:?}", service_in(dir.path()));
        assert!(rendered.contains("unreachable"));
    }

    #[test]
    fn mask_long_value() {
        assert_eq!(mask_secret("sk-live-abcdefghijklmnop"), "sk-l...mnop");
    }

    #[test]
    fn mask_short_value() {
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn mask_exact_boundary() {
        assert_eq!(mask_secret("1234567890"), "1234...7890");
    }

    #[test]
    fn mask_multibyte_does_not_panic() {
        assert_eq!(mask_secret("ключ-секрет-апи"), "ключ...-апи");
    }

    #[test]
    fn blank_api_key_rejected() {
        assert!(matches!(
            validate_api_key("   "),
            Err(DevkoolError::InvalidInput(_))
        ));
        assert!(validate_api_key("k1").is_ok());
    }
}
