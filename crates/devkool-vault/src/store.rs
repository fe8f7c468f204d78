// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk record collection.
//!
//! The store is one JSON object mapping record ids to sealed records. Every
//! mutation rewrites the whole file through a temp file and an atomic rename,
//! so readers see either the old or the new collection, never a mix.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use devkool_config::StorageConfig;
use devkool_core::{DevkoolError, RecordId};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::envelope::EncryptedField;

/// One stored credential. Always complete before it enters a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub api_key: EncryptedField,
    pub endpoint: EncryptedField,
    pub category: String,
}

/// Records keyed by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCollection {
    entries: Vec<(RecordId, Record)>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.position(id).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, id: &RecordId) -> Option<&mut Record> {
        self.position(id).map(move |i| &mut self.entries[i].1)
    }

    /// Insert or replace. A replaced record keeps its original position.
    pub fn insert(&mut self, id: RecordId, record: Record) -> Option<Record> {
        match self.position(&id) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, record)),
            None => {
                self.entries.push((id, record));
                None
            }
        }
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        self.position(id).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &Record)> {
        self.entries.iter().map(|(id, record)| (id, record))
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == id)
    }
}

impl Serialize for RecordCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for RecordCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CollectionVisitor;

        impl<'de> Visitor<'de> for CollectionVisitor {
            type Value = RecordCollection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of record ids to records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut collection = RecordCollection::new();
                while let Some((id, record)) = map.next_entry::<RecordId, Record>()? {
                    collection.insert(id, record);
                }
                Ok(collection)
            }
        }

        deserializer.deserialize_map(CollectionVisitor)
    }
}

/// Condition of the store file at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreHealth {
    /// No store file yet.
    Missing,
    /// Parsed successfully.
    Healthy,
    /// File exists but is not a valid record collection.
    Malformed,
    /// File exists but could not be read.
    Unreadable,
}

impl fmt::Display for StoreHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreHealth::Missing => "missing",
            StoreHealth::Healthy => "healthy",
            StoreHealth::Malformed => "malformed",
            StoreHealth::Unreadable => "unreadable",
        })
    }
}

/// Result of [`RecordStore::load`]: always a collection, plus what went wrong
/// if the read was degraded.
#[derive(Debug)]
pub struct StoreSnapshot {
    pub records: RecordCollection,
    pub health: StoreHealth,
    pub problem: Option<DevkoolError>,
}

impl StoreSnapshot {
    pub fn is_degraded(&self) -> bool {
        self.problem.is_some()
    }
}

/// Reads and atomically rewrites the record store file.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. Never fails: a missing file is an empty store,
    /// and an unreadable or malformed file is an empty store plus a
    /// non-fatal [`DevkoolError::Persistence`] in `problem`.
    pub fn load(&self) -> StoreSnapshot {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StoreSnapshot {
                    records: RecordCollection::new(),
                    health: StoreHealth::Missing,
                    problem: None,
                };
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "record store unreadable");
                return StoreSnapshot {
                    records: RecordCollection::new(),
                    health: StoreHealth::Unreadable,
                    problem: Some(DevkoolError::persistence(
                        format!("cannot read {}", self.path.display()),
                        e,
                    )),
                };
            }
        };

        if content.trim().is_empty() {
            return StoreSnapshot {
                records: RecordCollection::new(),
                health: StoreHealth::Healthy,
                problem: None,
            };
        }

        match serde_json::from_str::<RecordCollection>(&content) {
            Ok(records) => {
                debug!(count = records.len(), "record store loaded");
                StoreSnapshot {
                    records,
                    health: StoreHealth::Healthy,
                    problem: None,
                }
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "record store is malformed; treating as empty");
                StoreSnapshot {
                    records: RecordCollection::new(),
                    health: StoreHealth::Malformed,
                    problem: Some(DevkoolError::persistence(
                        format!("{} is not a valid record store", self.path.display()),
                        e,
                    )),
                }
            }
        }
    }

    /// Replace the stored collection with `records`.
    ///
    /// Writes a temp file beside the store, fsyncs it, then renames it over
    /// the store. On failure the previous file is left as it was.
    pub fn save(&self, records: &RecordCollection) -> Result<(), DevkoolError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| DevkoolError::persistence(format!("cannot create {}", dir.display()), e))?;

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| DevkoolError::persistence("cannot serialize record store", e))?;

        let write_err =
            |e: std::io::Error| DevkoolError::persistence(format!("cannot write {}", self.path.display()), e);
        let mut tmp = tempfile::Builder::new()
            .prefix(".api-store")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(count = records.len(), path = %self.path.display(), "record store saved");
        Ok(())
    }

    /// Move a malformed store aside as `<store>.corrupt-<UTC timestamp>`.
    pub fn preserve_corrupt(&self) -> Result<PathBuf, DevkoolError> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".corrupt-{stamp}"));
        let target = self.path.with_file_name(name);

        std::fs::rename(&self.path, &target).map_err(|e| {
            DevkoolError::persistence(
                format!("cannot move malformed store to {}", target.display()),
                e,
            )
        })?;
        warn!(from = %self.path.display(), to = %target.display(), "preserved malformed record store");
        Ok(target)
    }
}
