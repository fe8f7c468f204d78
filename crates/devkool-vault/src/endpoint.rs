// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint URL syntax check.

use std::sync::LazyLock;

use devkool_core::DevkoolError;
use regex::Regex;

/// `scheme://host[:port][/path][?query][#fragment]` with a DNS name,
/// `localhost`, IPv4, or bracketed IPv6 host.
static ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^
        https?://
        (?:
            (?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\.?
          | localhost
          | \d{1,3}(?:\.\d{1,3}){3}
          | \[[0-9a-f:.]+\]
        )
        (?::\d{1,5})?
        (?:[/?\#]\S*)?
        $",
    )
    .expect("endpoint pattern is valid")
});

/// Check that `endpoint` is a well-formed http(s) URL.
pub fn validate_endpoint(endpoint: &str) -> Result<(), DevkoolError> {
    let reject = |reason: &str| DevkoolError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    if endpoint.trim().is_empty() {
        return Err(reject("endpoint is empty"));
    }
    if !(starts_with_ignore_case(endpoint, "http://") || starts_with_ignore_case(endpoint, "https://")) {
        return Err(reject("must start with http:// or https://"));
    }
    if !ENDPOINT_PATTERN.is_match(endpoint) {
        return Err(reject("not a valid URL"));
    }
    Ok(())
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
