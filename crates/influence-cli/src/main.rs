//! influence - command-line client for the influencer marketing platform.
//!
//! Brands browse creators, run campaigns and review applications; creators
//! browse campaigns and apply. Every invocation restores the stored session
//! first, so commands run as the signed-in user.

mod cli;
mod commands;
mod output;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use influence_core::{ApiClient, Config, CredentialStore, SessionStore};

use cli::Cli;

// ============================================================================
// Constants
// ============================================================================

/// When set, logs are also written to daily-rolling files in this directory
const LOG_DIR_ENV: &str = "INFLUENCE_LOG_DIR";

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "influence.log";

/// Fallback directory for the file credential store
const FALLBACK_DATA_DIR: &str = ".influence";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(ref url) = cli.api_url {
        config.api_base_url = url.clone();
    }

    let data_dir = config
        .data_dir()
        .unwrap_or_else(|_| PathBuf::from(FALLBACK_DATA_DIR));
    let credentials = CredentialStore::new(config.storage.select(&data_dir).await);
    debug!(backend = credentials.backend_name(), "Credential store ready");

    let api = ApiClient::from_config(&config, credentials)
        .with_context(|| format!("Invalid API URL: {}", config.api_base_url))?;
    let session = SessionStore::new(api);
    let _listener = session.spawn_event_listener();

    let state = session.load_user().await;
    info!(
        authenticated = state.is_authenticated(),
        api = %config.api_base_url,
        "influence starting"
    );

    commands::run(cli.command, &session, &mut config, cli.json).await
}
