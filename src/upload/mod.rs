//! Upload pipeline: transport, retry policy, and orchestration.
//!
//! This module turns a dropped file into a delivered submission on the remote
//! cloud-download service.
//!
//! # Features
//!
//! - Multipart submission of torrent and NZB payloads, text submission of magnets
//! - Bearer authentication and a per-call deadline on every request
//! - Structured errors that tag deadline expiry separately from other failures
//! - Exponential backoff for timeout-class failures only
//! - Optional deletion of the source file after a confirmed upload
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use dropwatch_core::config::{ApiCredential, ServiceSettings};
//! use dropwatch_core::upload::{ApiClient, RetryPolicy, UploadEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ServiceSettings::new("https://api.torbox.app", ApiCredential::new("key"))?;
//! let client = ApiClient::new(settings)?;
//! let engine = UploadEngine::new(Arc::new(client), RetryPolicy::default(), true);
//! let report = engine.process(Path::new("/watch/movie.torrent")).await;
//! println!("{report:?}");
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod retry;

pub use client::{ApiClient, Transport, UploadOutcome};
pub use constants::{
    CONNECT_TIMEOUT_SECS, MAGNET_ENDPOINT, TORRENT_ENDPOINT, UPLOAD_TIMEOUT_SECS, USENET_ENDPOINT,
};
pub use engine::{DeletionOutcome, ProcessReport, UploadEngine};
pub use error::UploadError;
pub use retry::{
    ClassifyFailure, DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryError, RetryPolicy,
    classify_error, with_retry,
};

// Note: no module-local Result aliases. Use `Result<T, UploadError>` explicitly.
