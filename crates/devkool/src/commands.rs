// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations: call the vault service, print the outcome.

use std::error::Error as _;

use colored::Colorize;
use devkool_core::{DevkoolError, RecordId};
use devkool_vault::{mask_secret, Credential, StoreHealth, VaultService};
use secrecy::ExposeSecret;
use serde::Serialize;

/// One credential in `--json` output.
#[derive(Debug, Serialize)]
struct CredentialJson<'a> {
    id: &'a str,
    api_key: String,
    endpoint: &'a str,
    category: &'a str,
}

/// A record that could not be decrypted, in `--json` output.
#[derive(Debug, Serialize)]
struct FailureJson {
    id: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct ListJson<'a> {
    credentials: Vec<CredentialJson<'a>>,
    failures: Vec<FailureJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_problem: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusJson {
    key_source: String,
    key_path: String,
    store_path: String,
    store_health: String,
    record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_problem: Option<String>,
}

fn displayed_key(credential: &Credential, mask: bool) -> String {
    let key = credential.api_key.expose_secret();
    if mask {
        mask_secret(key)
    } else {
        key.to_string()
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DevkoolError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| DevkoolError::Internal(format!("failed to render JSON: {e}")))
}

/// Print an error and its source chain to stderr.
pub fn print_error(error: &DevkoolError, use_color: bool) {
    for line in render_error(error, use_color) {
        eprintln!("{line}");
    }
}

fn render_error(error: &DevkoolError, use_color: bool) -> Vec<String> {
    let mut lines = vec![if use_color {
        format!("{} {error}", "error:".red().bold())
    } else {
        format!("error: {error}")
    }];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("  caused by: {cause}"));
        source = cause.source();
    }
    lines
}

fn warn_line(message: &str, use_color: bool) {
    if use_color {
        eprintln!("{} {message}", "warning:".yellow().bold());
    } else {
        eprintln!("warning: {message}");
    }
}

/// `devkool add <API_KEY> <ENDPOINT>`
pub async fn run_add(
    service: &VaultService,
    api_key: &str,
    endpoint: &str,
    use_color: bool,
) -> Result<(), DevkoolError> {
    let outcome = service.add(api_key, endpoint).await?;
    if let Some(path) = &outcome.preserved_corrupt {
        warn_line(
            &format!("malformed record store was moved to {}", path.display()),
            use_color,
        );
    }
    if use_color {
        println!(
            "{} Stored credential {} (category: {})",
            "✓".green(),
            outcome.id.as_str().bold(),
            outcome.category.cyan()
        );
    } else {
        println!(
            "Stored credential {} (category: {})",
            outcome.id, outcome.category
        );
    }
    Ok(())
}

/// `devkool list [--json] [--mask]`
///
/// Records that fail to decrypt are reported but do not fail the command.
pub fn run_list(
    service: &VaultService,
    json: bool,
    mask: bool,
    use_color: bool,
) -> Result<(), DevkoolError> {
    let report = service.list()?;

    if json {
        let out = ListJson {
            credentials: report
                .credentials
                .iter()
                .map(|c| CredentialJson {
                    id: c.id.as_str(),
                    api_key: displayed_key(c, mask),
                    endpoint: &c.endpoint,
                    category: &c.category,
                })
                .collect(),
            failures: report
                .failures
                .iter()
                .map(|f| FailureJson {
                    id: f.id.to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
            store_problem: report.store_problem.as_ref().map(ToString::to_string),
        };
        println!("{}", to_json(&out)?);
        return Ok(());
    }

    if let Some(problem) = &report.store_problem {
        warn_line(&problem.to_string(), use_color);
    }

    if report.credentials.is_empty() && report.failures.is_empty() {
        println!("No credentials stored yet.");
        return Ok(());
    }

    println!("Stored credentials ({}):", report.credentials.len());
    for credential in &report.credentials {
        print_credential(credential, mask, use_color);
    }

    for failure in &report.failures {
        if use_color {
            println!(
                "  {} {} could not be decrypted: {}",
                "✗".red(),
                failure.id.as_str().bold(),
                failure.error
            );
        } else {
            println!(
                "  [SKIPPED] {} could not be decrypted: {}",
                failure.id, failure.error
            );
        }
    }
    Ok(())
}

fn print_credential(credential: &Credential, mask: bool, use_color: bool) {
    println!();
    if use_color {
        println!("  {}", credential.id.as_str().bold());
    } else {
        println!("  {}", credential.id);
    }
    println!("    api key:  {}", displayed_key(credential, mask));
    println!("    endpoint: {}", credential.endpoint);
    println!("    category: {}", credential.category);
}

/// `devkool show <ID> [--mask]`
pub fn run_show(service: &VaultService, id: &RecordId, mask: bool) -> Result<(), DevkoolError> {
    let credential = service.show(id)?;
    println!("id:       {}", credential.id);
    println!("api key:  {}", displayed_key(&credential, mask));
    println!("endpoint: {}", credential.endpoint);
    println!("category: {}", credential.category);
    Ok(())
}

/// `devkool update <ID> [--new-api-key K] [--new-endpoint E]`
pub async fn run_update(
    service: &VaultService,
    id: &RecordId,
    new_api_key: Option<&str>,
    new_endpoint: Option<&str>,
    use_color: bool,
) -> Result<(), DevkoolError> {
    let outcome = service.update(id, new_api_key, new_endpoint).await?;

    let mut changed = Vec::new();
    if outcome.api_key_changed {
        changed.push("api key");
    }
    if outcome.endpoint_changed {
        changed.push("endpoint");
    }
    let changed = if changed.is_empty() {
        "nothing".to_string()
    } else {
        changed.join(" and ")
    };

    if use_color {
        println!(
            "{} Updated {} of {} (category: {})",
            "✓".green(),
            changed,
            outcome.id.as_str().bold(),
            outcome.category.cyan()
        );
    } else {
        println!(
            "Updated {changed} of {} (category: {})",
            outcome.id, outcome.category
        );
    }
    Ok(())
}

/// `devkool delete <ID>`
pub fn run_delete(
    service: &VaultService,
    id: &RecordId,
    use_color: bool,
) -> Result<(), DevkoolError> {
    service.delete(id)?;
    if use_color {
        println!("{} Deleted {}", "✓".green(), id.as_str().bold());
    } else {
        println!("Deleted {id}");
    }
    Ok(())
}

/// `devkool status [--json]`
pub fn run_status(service: &VaultService, json: bool, use_color: bool) -> Result<(), DevkoolError> {
    let status = service.status();

    if json {
        let out = StatusJson {
            key_source: status.key_source.to_string(),
            key_path: status.key_path.display().to_string(),
            store_path: status.store_path.display().to_string(),
            store_health: status.store_health.to_string(),
            record_count: status.record_count,
            store_problem: status.store_problem.as_ref().map(ToString::to_string),
        };
        println!("{}", to_json(&out)?);
        return Ok(());
    }

    println!();
    println!("  devkool status");
    println!("  {}", "-".repeat(35));
    println!("    Key:      {} ({})", status.key_source, status.key_path.display());
    let health = status.store_health.to_string();
    let health = if !use_color {
        health
    } else if status.store_health == StoreHealth::Healthy
        || status.store_health == StoreHealth::Missing
    {
        health.green().to_string()
    } else {
        health.red().to_string()
    };
    println!("    Store:    {} ({})", health, status.store_path.display());
    println!("    Records:  {}", status.record_count);
    if let Some(problem) = &status.store_problem {
        println!("    Problem:  {problem}");
    }
    println!();
    Ok(())
}
