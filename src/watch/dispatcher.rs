//! Event loop that turns folder events into upload tasks.
//!
//! Every qualifying creation event is handed to its own tokio task, so a
//! slow or retrying upload never delays detection of the next file. A
//! semaphore bounds how many uploads run at once.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace, warn};

use super::error::WatchError;
use super::event::WatchEvent;
use super::watcher::{EventReceiver, FolderWatcher};
use crate::classify::is_watched;
use crate::upload::{DeletionOutcome, ProcessReport, UploadEngine};

/// Default number of uploads allowed in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default wait between detecting a file and reading it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Tuning for the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Pause before processing so writers can finish the file.
    pub settle_delay: Duration,
    /// Maximum concurrent uploads (at least 1).
    pub concurrency: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Counters for one dispatcher lifetime.
///
/// Updated from concurrent upload tasks with atomics.
#[derive(Debug, Default)]
pub struct DispatchStats {
    uploaded: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    deleted: AtomicUsize,
}

impl DispatchStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of files the service accepted.
    #[must_use]
    pub fn uploaded(&self) -> usize {
        self.uploaded.load(Ordering::SeqCst)
    }

    /// Returns the number of files that failed to upload.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of files skipped as unrecognized.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Returns the number of source files removed after upload.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Returns uploaded + failed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.uploaded() + self.failed()
    }

    fn record(&self, report: &ProcessReport) {
        match report {
            ProcessReport::Skipped { .. } => {
                self.skipped.fetch_add(1, Ordering::SeqCst);
            }
            ProcessReport::Uploaded { deletion, .. } => {
                self.uploaded.fetch_add(1, Ordering::SeqCst);
                if *deletion == DeletionOutcome::Deleted {
                    self.deleted.fetch_add(1, Ordering::SeqCst);
                }
            }
            ProcessReport::Failed { .. } => {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

/// Routes watch events to the upload engine.
#[derive(Debug)]
pub struct Dispatcher {
    engine: Arc<UploadEngine>,
    options: DispatchOptions,
    semaphore: Arc<Semaphore>,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    /// Creates a dispatcher. A concurrency of zero is treated as one.
    #[must_use]
    pub fn new(engine: Arc<UploadEngine>, options: DispatchOptions) -> Self {
        let concurrency = options.concurrency.max(1);
        Self {
            engine,
            options: DispatchOptions {
                concurrency,
                ..options
            },
            semaphore: Arc::new(Semaphore::new(concurrency)),
            stats: Arc::new(DispatchStats::new()),
        }
    }

    /// Returns the effective options.
    #[must_use]
    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Returns the running counters.
    #[must_use]
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Watches `folder` until `shutdown` resolves or watching fails.
    ///
    /// # Errors
    ///
    /// Returns a [`WatchError`] if the folder cannot be watched or the event
    /// stream ends unexpectedly.
    pub async fn watch_folder<S>(&self, folder: &Path, shutdown: S) -> Result<(), WatchError>
    where
        S: Future<Output = ()>,
    {
        let (watcher, events) = FolderWatcher::start(folder)?;
        let result = self.run(events, shutdown).await;
        drop(watcher);
        result
    }

    /// Consumes `events` until `shutdown` resolves or the stream ends.
    ///
    /// In-flight uploads are always awaited before returning.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::ChannelClosed`] when the stream ends on its own,
    /// or the first fatal error it carries. Backend errors are logged and
    /// watching continues.
    pub async fn run<S>(&self, mut events: EventReceiver, shutdown: S) -> Result<(), WatchError>
    where
        S: Future<Output = ()>,
    {
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown requested");
                    break Ok(());
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
                next = events.recv() => match next {
                    Some(Ok(event)) => self.dispatch(event, &mut tasks),
                    Some(Err(e)) if e.is_fatal() => {
                        error!(error = %e, "watching stopped");
                        break Err(e);
                    }
                    Some(Err(e)) => warn!(error = %e, "watch error"),
                    None => {
                        error!("watch event channel closed");
                        break Err(WatchError::ChannelClosed);
                    }
                },
            }
        };

        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        info!(
            uploaded = self.stats.uploaded(),
            failed = self.stats.failed(),
            skipped = self.stats.skipped(),
            deleted = self.stats.deleted(),
            "dispatcher stopped"
        );
        result
    }

    fn dispatch(&self, event: WatchEvent, tasks: &mut JoinSet<()>) {
        if !event.is_create() {
            trace!(path = %event.path.display(), "ignoring non-create event");
            return;
        }
        if !is_watched(&event.path) {
            debug!(path = %event.path.display(), "ignoring unwatched file");
            return;
        }

        info!(path = %event.path.display(), "new file detected");

        let engine = Arc::clone(&self.engine);
        let semaphore = Arc::clone(&self.semaphore);
        let stats = Arc::clone(&self.stats);
        let settle_delay = self.options.settle_delay;

        tasks.spawn(async move {
            if !settle_delay.is_zero() {
                tokio::time::sleep(settle_delay).await;
            }
            let Ok(_permit) = semaphore.acquire_owned().await else {
                warn!(path = %event.path.display(), "upload slots closed, dropping file");
                return;
            };
            let report = engine.process(&event.path).await;
            stats.record(&report);
        });
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "upload task panicked");
    }
}
