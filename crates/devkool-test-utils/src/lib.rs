// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for devkool integration tests.
//!
//! # Components
//!
//! - [`MockClassifier`] - Classifier with scripted results and call capture
//! - [`TestHarness`] - Vault service over a temporary data directory

pub mod harness;
pub mod mock_classifier;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_classifier::MockClassifier;
