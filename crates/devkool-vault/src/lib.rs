// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encrypted credential store for devkool.
//!
//! A single random key (file or `DEVKOOL_SECRET_KEY`) seals every api key and
//! endpoint into a self-describing token. Records live in one JSON document
//! keyed by record id; the category is stored in the clear.

pub mod crypto;
pub mod endpoint;
pub mod envelope;
pub mod keys;
pub mod service;
pub mod store;

pub use endpoint::validate_endpoint;
pub use envelope::{EncryptedField, Envelope};
pub use keys::{encode_key, KeyManager, SecretKey, SECRET_KEY_ENV_VAR};
pub use service::{
    mask_secret, AddOutcome, Credential, ListReport, RecordFailure, StatusReport, UpdateOutcome,
    VaultService,
};
pub use store::{Record, RecordCollection, RecordStore, StoreHealth, StoreSnapshot};
