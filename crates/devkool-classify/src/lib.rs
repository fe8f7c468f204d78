// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint classifiers for devkool.
//!
//! Every backend implements [`devkool_core::Classifier`]; the vault service
//! only ever sees the trait object returned by [`build_classifier`].

pub mod heuristic;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devkool_config::{ClassifierBackend, ClassifierConfig};
use devkool_core::{Classification, Classifier, DevkoolError};
use tracing::debug;

pub use heuristic::HeuristicClassifier;
pub use remote::RemoteClassifier;

/// Classifier that always fails, so every record is stored as
/// `Uncategorized`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClassifier;

#[async_trait]
impl Classifier for DisabledClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn classify(&self, _text: &str) -> Result<Classification, DevkoolError> {
        Err(DevkoolError::Classification(
            "classification is disabled".to_string(),
        ))
    }
}

/// Build the classifier selected by `config.backend`.
pub fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>, DevkoolError> {
    let classifier: Arc<dyn Classifier> = match config.backend {
        ClassifierBackend::Heuristic => {
            Arc::new(HeuristicClassifier::new(&config.candidate_labels))
        }
        ClassifierBackend::Remote => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                DevkoolError::Config("classifier.endpoint is required for the remote backend".into())
            })?;
            Arc::new(RemoteClassifier::new(
                endpoint,
                config.api_token.clone(),
                Duration::from_secs(config.timeout_secs),
                config.candidate_labels.clone(),
            )?)
        }
        ClassifierBackend::Disabled => Arc::new(DisabledClassifier),
    };
    debug!(backend = classifier.name(), "classifier ready");
    Ok(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_always_fails() {
        let err = DisabledClassifier.classify("https://api.stripe.com").await.unwrap_err();
        assert!(matches!(err, DevkoolError::Classification(_)));
    }

    #[test]
    fn default_config_builds_heuristic() {
        let classifier = build_classifier(&ClassifierConfig::default()).unwrap();
        assert_eq!(classifier.name(), "heuristic");
    }

    #[test]
    fn disabled_backend_builds() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Disabled,
            ..ClassifierConfig::default()
        };
        assert_eq!(build_classifier(&config).unwrap().name(), "disabled");
    }

    #[test]
    fn remote_without_endpoint_is_config_error() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Remote,
            ..ClassifierConfig::default()
        };
        let err = build_classifier(&config).err().unwrap();
        assert!(matches!(err, DevkoolError::Config(_)));
    }

    #[test]
    fn remote_with_endpoint_builds() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Remote,
            endpoint: Some("http://127.0.0.1:9/classify".into()),
            api_token: Some("hf_test".into()),
            ..ClassifierConfig::default()
        };
        assert_eq!(build_classifier(&config).unwrap().name(), "remote");
    }
}
