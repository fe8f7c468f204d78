// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword classification of endpoint URLs.
//!
//! Splits the endpoint into host and path tokens and scores every candidate
//! label against a keyword table. No network, no latency.

use async_trait::async_trait;
use devkool_core::{Classification, Classifier, DevkoolError};

/// Weight of a keyword found in the host.
const HOST_WEIGHT: u32 = 2;
/// Weight of a keyword found in the path or query.
const PATH_WEIGHT: u32 = 1;

/// Keyword table per known label. Path tokens and keywords shorter than four
/// characters only match whole tokens; longer keywords also match inside a
/// host token (`openweathermap` contains `weather`).
const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Finance",
        &[
            "bank", "banking", "finance", "financial", "plaid", "stock", "stocks", "quote",
            "forex", "fx", "exchangerate", "crypto", "coinbase", "binance", "alphavantage",
            "iex", "ledger", "trading", "invest",
        ],
    ),
    (
        "Payments",
        &[
            "stripe", "paypal", "braintree", "adyen", "square", "checkout", "payment",
            "payments", "pay", "billing", "invoice", "charges", "razorpay", "klarna",
        ],
    ),
    (
        "Weather",
        &[
            "weather", "openweathermap", "forecast", "climate", "meteo", "accuweather",
            "tomorrow", "storm",
        ],
    ),
    (
        "Maps & Geolocation",
        &[
            "maps", "map", "geo", "geocode", "geocoding", "mapbox", "places", "directions",
            "location", "ipinfo", "ipapi", "osm", "nominatim",
        ],
    ),
    (
        "AI & Machine Learning",
        &[
            "openai", "anthropic", "huggingface", "cohere", "mistral", "gemini", "ai", "ml",
            "llm", "inference", "completions", "embeddings", "model", "models", "replicate",
            "groq",
        ],
    ),
    (
        "Social Media",
        &[
            "twitter", "facebook", "instagram", "linkedin", "reddit", "tiktok", "mastodon",
            "graph", "social", "youtube", "pinterest",
        ],
    ),
    (
        "Messaging",
        &[
            "twilio", "slack", "discord", "telegram", "whatsapp", "sendgrid", "mailgun",
            "messages", "message", "sms", "chat", "email", "mail", "notify", "push",
        ],
    ),
    (
        "Developer Tools",
        &[
            "github", "gitlab", "bitbucket", "sentry", "circleci", "jira", "atlassian",
            "npm", "pypi", "docker", "repos", "git", "ci",
        ],
    ),
    (
        "Cloud Infrastructure",
        &[
            "aws", "amazonaws", "azure", "gcp", "googlecloud", "cloudflare", "digitalocean",
            "heroku", "vercel", "netlify", "storage", "compute", "s3", "lambda",
        ],
    ),
    (
        "E-commerce",
        &[
            "shopify", "woocommerce", "ebay", "etsy", "products", "product", "cart",
            "orders", "order", "catalog", "shop", "store", "commerce",
        ],
    ),
    (
        "Media & Entertainment",
        &[
            "spotify", "netflix", "tmdb", "imdb", "movie", "movies", "music", "video",
            "twitch", "soundcloud", "podcast", "games",
        ],
    ),
    (
        "News",
        &[
            "news", "newsapi", "headlines", "nytimes", "guardian", "reuters", "articles",
            "feed", "rss",
        ],
    ),
];

/// Heuristic endpoint classifier with zero cost and zero latency.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    rules: Vec<(String, &'static [&'static str])>,
}

impl HeuristicClassifier {
    /// Classifier restricted to `labels`. Labels without a keyword table are
    /// accepted but can never win.
    pub fn new(labels: &[String]) -> Self {
        let rules = labels
            .iter()
            .filter_map(|label| {
                KEYWORDS
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(label))
                    .map(|(_, keywords)| (label.clone(), *keywords))
            })
            .collect();
        Self { rules }
    }

    /// Score `endpoint` synchronously.
    ///
    /// Confidence is `best / (best + runner_up + 1)`: a single host keyword
    /// gives 0.67, a single path keyword 0.5, and a tie stays below 0.5.
    pub fn score(&self, endpoint: &str) -> Classification {
        let (host_tokens, path_tokens) = tokenize(endpoint);

        let mut scores: Vec<(&str, u32)> = self
            .rules
            .iter()
            .map(|(label, keywords)| {
                let score = keywords
                    .iter()
                    .map(|kw| {
                        if host_tokens.iter().any(|t| matches_host_keyword(t, kw)) {
                            HOST_WEIGHT
                        } else if path_tokens.iter().any(|t| t == kw) {
                            PATH_WEIGHT
                        } else {
                            0
                        }
                    })
                    .sum();
                (label.as_str(), score)
            })
            .collect();
        // Stable sort keeps table order among equal scores.
        scores.sort_by(|a, b| b.1.cmp(&a.1));

        let (label, best) = scores.first().copied().unwrap_or(("", 0));
        let runner_up = scores.get(1).map(|s| s.1).unwrap_or(0);
        if best == 0 {
            return Classification::new(label, 0.0);
        }
        let confidence = best as f32 / (best + runner_up + 1) as f32;
        Classification::new(label, confidence)
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        let labels: Vec<String> = KEYWORDS.iter().map(|(l, _)| l.to_string()).collect();
        Self::new(&labels)
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn classify(&self, text: &str) -> Result<Classification, DevkoolError> {
        Ok(self.score(text))
    }
}

fn matches_host_keyword(token: &str, keyword: &str) -> bool {
    token == keyword || (keyword.len() >= 4 && token.contains(keyword))
}

/// Lowercased host labels and path/query words of a URL-ish string.
fn tokenize(endpoint: &str) -> (Vec<String>, Vec<String>) {
    let lower = endpoint.trim().to_ascii_lowercase();
    let rest = lower.split_once("://").map(|(_, r)| r).unwrap_or(&lower);
    let (authority, tail) = match rest.find(['/', '?', '#']) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.split_once(']'))
        .map(|(h, _)| h)
        .unwrap_or_else(|| host.split(':').next().unwrap_or(host));

    let words = |s: &str| -> Vec<String> {
        s.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    };
    (words(host), words(tail))
}
