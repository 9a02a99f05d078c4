//! Platform folder watcher bridged onto a tokio channel.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::error::WatchError;
use super::event::{WatchEvent, from_notify};

/// Buffered events between the notify thread and the dispatcher.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Receiving half of the watch event stream.
pub type EventReceiver = mpsc::Receiver<Result<WatchEvent, WatchError>>;

/// Watches a single folder (non-recursively) for new files.
///
/// Events stop when this value is dropped; the receiver then yields `None`.
pub struct FolderWatcher {
    _watcher: RecommendedWatcher,
    folder: PathBuf,
}

impl std::fmt::Debug for FolderWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderWatcher")
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

impl FolderWatcher {
    /// Starts watching `folder`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::FolderNotFound`] or [`WatchError::NotADirectory`]
    /// for a bad path, and [`WatchError::Start`] if the platform watcher
    /// cannot be registered.
    pub fn start(folder: &Path) -> Result<(Self, EventReceiver), WatchError> {
        Self::start_with_capacity(folder, DEFAULT_EVENT_CAPACITY)
    }

    /// Starts watching `folder` with a custom channel capacity.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn start_with_capacity(
        folder: &Path,
        capacity: usize,
    ) -> Result<(Self, EventReceiver), WatchError> {
        ensure_directory(folder)?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for watch_event in from_notify(&event) {
                        // Receiver gone means the dispatcher has stopped.
                        if tx.blocking_send(Ok(watch_event)).is_err() {
                            return;
                        }
                    }
                }
                Err(error) => {
                    let _ = tx.blocking_send(Err(WatchError::Backend(error)));
                }
            })
            .map_err(|source| WatchError::Start {
                path: folder.to_path_buf(),
                source,
            })?;

        watcher
            .watch(folder, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Start {
                path: folder.to_path_buf(),
                source,
            })?;

        info!(folder = %folder.display(), "watching folder");
        Ok((
            Self {
                _watcher: watcher,
                folder: folder.to_path_buf(),
            },
            rx,
        ))
    }

    /// Returns the watched folder.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

fn ensure_directory(folder: &Path) -> Result<(), WatchError> {
    match std::fs::metadata(folder) {
        Ok(meta) if meta.is_dir() => {
            debug!(folder = %folder.display(), "watch folder ok");
            Ok(())
        }
        Ok(_) => Err(WatchError::NotADirectory {
            path: folder.to_path_buf(),
        }),
        Err(_) => Err(WatchError::FolderNotFound {
            path: folder.to_path_buf(),
        }),
    }
}
