//! Dropwatch Core Library
//!
//! This library provides the core functionality for the dropwatch daemon,
//! which watches a folder for dropped torrent, magnet, and NZB files and
//! forwards each one to a remote cloud-download service.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`classify`] - Content-kind classification of dropped files
//! - [`config`] - Process configuration built once at startup
//! - [`upload`] - HTTP transport, retry policy and upload orchestration
//! - [`watch`] - Folder watching and per-event dispatch
//!
//! Data flows one way: a filesystem event reaches the [`watch::Dispatcher`],
//! which hands qualifying paths to the [`upload::UploadEngine`], which submits
//! them through a [`upload::Transport`] under a [`upload::RetryPolicy`].

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod upload;
mod user_agent;
pub mod watch;

// Re-export commonly used types
pub use classify::{ContentKind, UploadRequest, classify, is_watched, sanitize_filename};
pub use config::{ApiCredential, ConfigError, ServiceSettings, WatchConfig};
pub use upload::{
    ApiClient, DEFAULT_MAX_RETRIES, DeletionOutcome, FailureType, ProcessReport, RetryDecision,
    RetryError, RetryPolicy, Transport, UploadEngine, UploadError, UploadOutcome, classify_error,
    with_retry,
};
pub use watch::{
    DEFAULT_CONCURRENCY, DispatchOptions, DispatchStats, Dispatcher, FolderWatcher, WatchError,
    WatchEvent, WatchEventKind,
};
