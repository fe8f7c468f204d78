// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! devkool - a local vault for API keys and their endpoints.
//!
//! This is the binary entry point.

mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use devkool_core::RecordId;
use devkool_vault::VaultService;
use tracing::debug;

/// devkool - store API keys and endpoints encrypted at rest.
#[derive(Parser, Debug)]
#[command(name = "devkool", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ./devkool.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Store an API key and its endpoint.
    Add {
        api_key: String,
        endpoint: String,
    },
    /// Decrypt and list every stored credential.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Show only the first and last characters of each api key.
        #[arg(long)]
        mask: bool,
    },
    /// Decrypt and show a single credential.
    Show {
        id: String,
        /// Show only the first and last characters of the api key.
        #[arg(long)]
        mask: bool,
    },
    /// Replace the api key and/or endpoint of a credential.
    Update {
        id: String,
        #[arg(long, value_name = "API_KEY")]
        new_api_key: Option<String>,
        #[arg(long, value_name = "ENDPOINT")]
        new_endpoint: Option<String>,
    },
    /// Remove a credential.
    Delete { id: String },
    /// Show key source, store location, and store health.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match devkool_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            devkool_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log.level);

    let use_color = !cli.plain && std::io::stdout().is_terminal();
    let error_color = !cli.plain && std::io::stderr().is_terminal();

    let classifier = match devkool_classify::build_classifier(&config.classifier) {
        Ok(classifier) => classifier,
        Err(e) => {
            commands::print_error(&e, error_color);
            return ExitCode::FAILURE;
        }
    };
    debug!(
        classifier = classifier.name(),
        store = %config.storage.store_path().display(),
        "vault ready"
    );
    let service = VaultService::from_config(&config.storage, classifier);

    let result = match cli.command {
        Commands::Add { api_key, endpoint } => {
            commands::run_add(&service, &api_key, &endpoint, use_color).await
        }
        Commands::List { json, mask } => commands::run_list(&service, json, mask, use_color),
        Commands::Show { id, mask } => {
            commands::run_show(&service, &RecordId::from(id.as_str()), mask)
        }
        Commands::Update {
            id,
            new_api_key,
            new_endpoint,
        } => {
            commands::run_update(
                &service,
                &RecordId::from(id.as_str()),
                new_api_key.as_deref(),
                new_endpoint.as_deref(),
                use_color,
            )
            .await
        }
        Commands::Delete { id } => {
            commands::run_delete(&service, &RecordId::from(id.as_str()), use_color)
        }
        Commands::Status { json } => commands::run_status(&service, json, use_color),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::print_error(&e, error_color);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout carries only command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("devkool={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
