//! Process configuration, constructed once at startup.
//!
//! The binary turns CLI flags and environment variables into a [`WatchConfig`],
//! validates it, and hands pieces of it to the transport, engine, and
//! dispatcher constructors. Nothing here is global or mutable after startup.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::upload::{DEFAULT_MAX_RETRIES, RetryPolicy, UPLOAD_TIMEOUT_SECS};
use crate::watch::{DEFAULT_CONCURRENCY, DEFAULT_SETTLE_DELAY, DispatchOptions};

/// Default service base URL.
pub const DEFAULT_API_BASE: &str = "https://api.torbox.app";

/// Default service API version path segment.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Errors raised while validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The service credential is empty.
    #[error("service API key must not be empty")]
    MissingCredential,

    /// The service base URL could not be parsed.
    #[error("invalid service base URL {url}: {source}")]
    InvalidApiBase {
        /// The rejected value.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The service base URL is not http(s).
    #[error("service base URL must use http or https, got {scheme}")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// The watch folder path is empty.
    #[error("watch folder must not be empty")]
    MissingWatchFolder,

    /// A numeric setting is out of range.
    #[error("invalid value for `{field}`: {value} (expected {expected})")]
    OutOfRange {
        /// Setting name.
        field: &'static str,
        /// Rejected value.
        value: u64,
        /// Human-readable accepted range.
        expected: &'static str,
    },
}

/// Bearer credential for the remote service.
///
/// `Debug` is redacted so the key never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Wraps a raw key, trimming surrounding whitespace.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// Returns the raw key for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

/// Settings for talking to the remote service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Base URL, e.g. `https://api.torbox.app`.
    pub api_base: Url,
    /// Version path segment, e.g. `v1`.
    pub api_version: String,
    /// Bearer credential attached to every call.
    pub credential: ApiCredential,
    /// Destination folder identifier for link and usenet submissions.
    pub folder_id: Option<String>,
    /// Deadline for a single request, including body upload.
    pub call_timeout: Duration,
}

impl ServiceSettings {
    /// Builds settings with the default API version and call deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL is invalid or not http(s).
    pub fn new(api_base: &str, credential: ApiCredential) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: parse_api_base(api_base)?,
            api_version: DEFAULT_API_VERSION.to_string(),
            credential,
            folder_id: None,
            call_timeout: Duration::from_secs(UPLOAD_TIMEOUT_SECS),
        })
    }

    /// Returns the full URL for an endpoint path such as `torrents/createtorrent`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.api_base.as_str().trim_end_matches('/');
        let version = self.api_version.trim_matches('/');
        if version.is_empty() {
            format!("{base}/api/{path}")
        } else {
            format!("{base}/{version}/api/{path}")
        }
    }
}

/// Parses and checks a service base URL.
///
/// # Errors
///
/// Returns [`ConfigError`] if the value is not an absolute http(s) URL.
pub fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidApiBase {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Folder to watch (non-recursive).
    pub watch_folder: PathBuf,
    /// Remote service settings.
    pub service: ServiceSettings,
    /// Delete the source file after a confirmed upload.
    pub delete_on_success: bool,
    /// Replace whitespace in the name reported to the service.
    pub sanitize_names: bool,
    /// Attempt budget per upload (including the first attempt).
    pub max_attempts: u32,
    /// First backoff delay; doubles per retry.
    pub retry_base_delay: Duration,
    /// Pause between a creation event and reading the file.
    pub settle_delay: Duration,
    /// Maximum uploads in flight at once.
    pub concurrency: usize,
}

impl WatchConfig {
    /// Builds a configuration with defaults for every tunable.
    #[must_use]
    pub fn new(watch_folder: impl Into<PathBuf>, service: ServiceSettings) -> Self {
        Self {
            watch_folder: watch_folder.into(),
            service,
            delete_on_success: false,
            sanitize_names: false,
            max_attempts: DEFAULT_MAX_RETRIES,
            retry_base_delay: RetryPolicy::default().base_delay(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Checks invariants the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_folder.as_os_str().is_empty() {
            return Err(ConfigError::MissingWatchFolder);
        }
        if self.service.credential.is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_attempts",
                value: 0,
                expected: "at least 1",
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                field: "concurrency",
                value: 0,
                expected: "at least 1",
            });
        }
        if self.service.call_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "upload_timeout",
                value: 0,
                expected: "at least 1 second",
            });
        }
        Ok(())
    }

    /// Retry policy derived from the attempt budget and base delay.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.max_attempts).base_delay_of(self.retry_base_delay)
    }

    /// Dispatcher options derived from this configuration.
    #[must_use]
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            settle_delay: self.settle_delay,
            concurrency: self.concurrency,
        }
    }
}
