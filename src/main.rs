//! CLI entry point for the dropwatch daemon.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dropwatch_core::{ApiClient, Dispatcher, UploadEngine};
use tracing::{debug, info, warn};

mod cli;
mod terminal;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let no_color = terminal::should_disable_color(
        args.no_color,
        terminal::no_color_env_requested(),
        terminal::is_dumb_terminal(),
    );
    terminal::init_tracing(args.default_log_level(), no_color);

    let config = args.into_config().context("invalid configuration")?;
    debug!(?config, "configuration loaded");

    info!(
        version = env!("CARGO_PKG_VERSION"),
        folder = %config.watch_folder.display(),
        api_base = %config.service.api_base,
        api_version = %config.service.api_version,
        delete_after_upload = config.delete_on_success,
        max_attempts = config.max_attempts,
        concurrency = config.concurrency,
        "dropwatch starting"
    );

    let client = ApiClient::new(config.service.clone()).context("failed to create API client")?;
    let engine = UploadEngine::from_config(&config, Arc::new(client));
    let dispatcher = Dispatcher::new(Arc::new(engine), config.dispatch_options());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    dispatcher
        .watch_folder(&config.watch_folder, shutdown)
        .await
        .with_context(|| format!("watching {} failed", config.watch_folder.display()))?;

    info!(total = dispatcher.stats().total(), "dropwatch stopped");
    Ok(())
}
