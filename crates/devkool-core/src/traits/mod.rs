// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the vault core and swappable infrastructure.

pub mod classifier;

pub use classifier::Classifier;
