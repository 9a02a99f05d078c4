//! CLI argument definitions using clap derive macros.
//!
//! Every setting can also come from the environment, so the daemon runs
//! unchanged in a container with only variables set.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::BoolishValueParser;

use dropwatch_core::config::{DEFAULT_API_BASE, DEFAULT_API_VERSION};
use dropwatch_core::{
    ApiCredential, ConfigError, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, ServiceSettings,
    WatchConfig,
};

/// Watch a folder and hand dropped torrents, magnets, and NZBs to the cloud.
///
/// Dropwatch uploads each new `.torrent`, `.magnet`, or `.nzb` file to the
/// service, retrying timeouts with backoff, and can delete the file afterwards.
#[derive(Parser, Debug)]
#[command(name = "dropwatch")]
#[command(author, version, about)]
pub struct Args {
    /// Folder to watch for new files
    #[arg(short = 'w', long, env = "TORBOX_WATCH_FOLDER")]
    pub watch_folder: PathBuf,

    /// API key for the service
    #[arg(short = 'k', long, env = "TORBOX_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Remote folder id to file uploads under
    #[arg(long, env = "TORBOX_FOLDER_ID")]
    pub folder_id: Option<String>,

    /// Delete each file after the service accepts it
    #[arg(
        short = 'd',
        long,
        env = "DELETE_AFTER_UPLOAD",
        action = clap::ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub delete_after_upload: bool,

    /// Service base URL
    #[arg(long, env = "TORBOX_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Service API version segment (empty to omit)
    #[arg(long, env = "TORBOX_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Attempts per upload, counting the first (1-10)
    #[arg(short = 'r', long, env = "DROPWATCH_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_retries: u32,

    /// First retry delay in milliseconds; doubles per retry (max 600000)
    #[arg(long, env = "DROPWATCH_RETRY_DELAY_MS", default_value_t = 5000, value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub retry_delay_ms: u64,

    /// Deadline per upload call in seconds (1-3600)
    #[arg(short = 't', long, env = "DROPWATCH_UPLOAD_TIMEOUT", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub upload_timeout: u64,

    /// Wait after a file appears before reading it, in milliseconds (max 60000)
    #[arg(long, env = "DROPWATCH_SETTLE_MS", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60_000))]
    pub settle_ms: u64,

    /// Maximum concurrent uploads (1-100)
    #[arg(short = 'c', long, env = "DROPWATCH_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Replace whitespace in names reported to the service with underscores
    #[arg(
        long,
        env = "DROPWATCH_SANITIZE_NAMES",
        action = clap::ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub sanitize_names: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Log level implied by `-q` / `-v`; `RUST_LOG` still wins.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Builds and validates the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a blank key, a bad base URL, or an
    /// out-of-range value.
    pub fn into_config(self) -> Result<WatchConfig, ConfigError> {
        let mut service = ServiceSettings::new(&self.api_base, ApiCredential::new(self.api_key))?;
        service.api_version = self.api_version.trim().trim_matches('/').to_string();
        service.folder_id = self
            .folder_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        service.call_timeout = Duration::from_secs(self.upload_timeout);

        let mut config = WatchConfig::new(self.watch_folder, service);
        config.delete_on_success = self.delete_after_upload;
        config.sanitize_names = self.sanitize_names;
        config.max_attempts = self.max_retries;
        config.retry_base_delay = Duration::from_millis(self.retry_delay_ms);
        config.settle_delay = Duration::from_millis(self.settle_ms);
        config.concurrency = usize::from(self.concurrency);

        config.validate()?;
        Ok(config)
    }
}
