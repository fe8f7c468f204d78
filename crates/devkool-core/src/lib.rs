// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the devkool credential vault.
//!
//! Holds the shared error taxonomy, identifier and classification types, and
//! the [`Classifier`] trait the CRUD service depends on.

pub mod error;
pub mod traits;
pub mod types;

pub use error::DevkoolError;
pub use traits::Classifier;
pub use types::{Classification, KeySource, RecordId, CONFIDENCE_THRESHOLD, UNCATEGORIZED};
