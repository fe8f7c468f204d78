// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock classifier for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use devkool_core::{Classification, Classifier, DevkoolError};

/// A classifier that returns pre-configured results.
///
/// Results are popped from a FIFO queue. When the queue is empty the
/// fallback is returned. Every classified text is recorded.
#[derive(Clone)]
pub struct MockClassifier {
    queue: Arc<Mutex<VecDeque<Result<Classification, String>>>>,
    fallback: Result<Classification, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockClassifier {
    /// Always answers `label` with `confidence`.
    pub fn fixed(label: &str, confidence: f32) -> Self {
        Self {
            queue: Arc::default(),
            fallback: Ok(Classification::new(label, confidence)),
            calls: Arc::default(),
        }
    }

    /// Always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            queue: Arc::default(),
            fallback: Err(message.to_string()),
            calls: Arc::default(),
        }
    }

    /// Queue a result ahead of the fallback.
    pub async fn push(&self, label: &str, confidence: f32) {
        self.queue
            .lock()
            .await
            .push_back(Ok(Classification::new(label, confidence)));
    }

    /// Queue a failure ahead of the fallback.
    pub async fn push_failure(&self, message: &str) {
        self.queue.lock().await.push_back(Err(message.to_string()));
    }

    /// Texts passed to `classify`, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::fixed("Finance", 0.9)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, text: &str) -> Result<Classification, DevkoolError> {
        self.calls.lock().await.push(text.to_string());
        let next = self
            .queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        next.map_err(DevkoolError::Classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_then_fallback() {
        let mock = MockClassifier::fixed("Weather", 0.8);
        mock.push("Finance", 0.2).await;

        let first = mock.classify("a").await.unwrap();
        assert_eq!(first.label, "Finance");
        let second = mock.classify("b").await.unwrap();
        assert_eq!(second.label, "Weather");
        assert_eq!(mock.calls().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failing_returns_classification_error() {
        let mock = MockClassifier::failing("offline");
        let err = mock.classify("x").await.unwrap_err();
        assert!(matches!(err, DevkoolError::Classification(m) if m == "offline"));
    }
}
