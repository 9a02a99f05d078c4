//! Error types for the watch module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while watching the folder.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The configured folder does not exist.
    #[error("watch folder does not exist: {path}")]
    FolderNotFound {
        /// The missing folder.
        path: PathBuf,
    },

    /// The configured path exists but is not a directory.
    #[error("watch path is not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The platform watcher could not be started on the folder.
    #[error("failed to watch {path}: {source}")]
    Start {
        /// The folder that could not be watched.
        path: PathBuf,
        /// The underlying notify error.
        #[source]
        source: notify::Error,
    },

    /// The platform watcher reported an error while running.
    #[error("watch backend error: {0}")]
    Backend(#[source] notify::Error),

    /// The event channel closed; no further events can arrive.
    #[error("watch event channel closed unexpectedly")]
    ChannelClosed,
}

impl WatchError {
    /// Returns true if the watch loop cannot continue after this error.
    ///
    /// Only errors reported by a running backend are recoverable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Backend(_))
    }
}
