// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-shot classification over HTTP.
//!
//! Speaks the Hugging Face inference format: the endpoint text goes out with
//! the candidate labels, and the label with the highest score comes back.

use std::time::Duration;

use async_trait::async_trait;
use devkool_core::{Classification, Classifier, DevkoolError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

/// Both response shapes seen in the wild: parallel arrays, or a list of
/// `{label, score}` pairs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns { labels: Vec<String>, scores: Vec<f32> },
    Pairs(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

impl ZeroShotResponse {
    fn best(self) -> Option<(String, f32)> {
        let pairs: Vec<(String, f32)> = match self {
            ZeroShotResponse::Columns { labels, scores } => {
                labels.into_iter().zip(scores).collect()
            }
            ZeroShotResponse::Pairs(pairs) => {
                pairs.into_iter().map(|p| (p.label, p.score)).collect()
            }
        };
        pairs
            .into_iter()
            .filter(|(_, score)| score.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// HTTP client for a zero-shot classification endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    labels: Vec<String>,
}

impl RemoteClassifier {
    /// Creates a client for `endpoint`, sending `api_token` as a bearer token
    /// when given.
    pub fn new(
        endpoint: String,
        api_token: Option<String>,
        timeout: Duration,
        labels: Vec<String>,
    ) -> Result<Self, DevkoolError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| DevkoolError::Config(format!("invalid classifier api token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DevkoolError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            labels,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn classify(&self, text: &str) -> Result<Classification, DevkoolError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: &self.labels,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DevkoolError::Classification(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        debug!(status = %status, "classifier response received");
        let body = response.text().await.map_err(|e| {
            DevkoolError::Classification(format!("failed to read response body: {e}"))
        })?;
        if !status.is_success() {
            return Err(DevkoolError::Classification(format!(
                "classifier returned {status}: {body}"
            )));
        }

        let parsed: ZeroShotResponse = serde_json::from_str(&body).map_err(|e| {
            DevkoolError::Classification(format!("failed to parse classifier response: {e}"))
        })?;
        let (label, score) = parsed.best().ok_or_else(|| {
            DevkoolError::Classification("classifier returned no labels".to_string())
        })?;
        Ok(Classification::new(label, score.clamp(0.0, 1.0)))
    }
}
