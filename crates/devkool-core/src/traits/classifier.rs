// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint classifier trait.

use async_trait::async_trait;

use crate::error::DevkoolError;
use crate::types::Classification;

/// Maps an endpoint string to a category label with a confidence score.
///
/// Implementations may be slow or fail; the CRUD service recovers every
/// failure into the `"Uncategorized"` label and never aborts a command
/// because of the classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Classify the given text.
    async fn classify(&self, text: &str) -> Result<Classification, DevkoolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Fixed;

    #[async_trait]
    impl Classifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(&self, _text: &str) -> Result<Classification, DevkoolError> {
            Ok(Classification::new("Weather", 0.3))
        }
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let classifier: Arc<dyn Classifier> = Arc::new(Fixed);
        let result = classifier.classify("https://api.weather.gov").await.unwrap();
        assert_eq!(classifier.name(), "fixed");
        assert_eq!(result.resolved_category(), crate::UNCATEGORIZED);
    }
}
