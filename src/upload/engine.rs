//! Upload orchestration for a single dropped file.
//!
//! The [`UploadEngine`] classifies a path, submits it through a [`Transport`]
//! under the configured [`RetryPolicy`], and optionally deletes the source
//! once the service has confirmed the submission.
//!
//! # Failure Handling
//!
//! - Unrecognized files are skipped before any network activity
//! - Timeout-class failures are retried with exponential backoff
//! - Any other failure ends the attempt sequence immediately
//! - Failures leave the source file in place for a later manual retry
//! - A failed deletion is reported separately and never marks the upload failed
//!
//! Nothing here returns an error to the caller: every outcome is logged and
//! summarized in a [`ProcessReport`], so one bad file cannot stop the watcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::client::{Transport, UploadOutcome};
use super::error::UploadError;
use super::retry::{RetryError, RetryPolicy, classify_error, with_retry};
use crate::classify::{ContentKind, UploadRequest};
use crate::config::WatchConfig;

/// What happened to the source file after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Deletion is disabled.
    NotRequested,
    /// The file was removed.
    Deleted,
    /// Removal failed; the upload still counts as successful.
    Failed {
        /// Rendered IO error.
        error: String,
    },
}

/// Summary of one call to [`UploadEngine::process`].
#[derive(Debug)]
pub enum ProcessReport {
    /// The path was not a recognized descriptor; nothing was sent.
    Skipped {
        /// The skipped path.
        path: PathBuf,
    },

    /// The service accepted the file.
    Uploaded {
        /// The uploaded path.
        path: PathBuf,
        /// Classified kind.
        kind: ContentKind,
        /// Service response.
        outcome: UploadOutcome,
        /// Source-file cleanup result.
        deletion: DeletionOutcome,
    },

    /// Every attempt failed; the file was left in place.
    Failed {
        /// The path that failed.
        path: PathBuf,
        /// Classified kind.
        kind: ContentKind,
        /// Terminal error.
        error: RetryError<UploadError>,
    },
}

impl ProcessReport {
    /// Returns true if the service accepted the file.
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }

    /// Returns true if the upload failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true if the path was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Drives one file through classification, upload, retry, and cleanup.
///
/// Holds no per-file state, so a single engine behind an `Arc` can process
/// unrelated files concurrently.
pub struct UploadEngine {
    transport: Arc<dyn Transport>,
    retry_policy: RetryPolicy,
    delete_on_success: bool,
    sanitize_names: bool,
}

impl std::fmt::Debug for UploadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadEngine")
            .field("retry_policy", &self.retry_policy)
            .field("delete_on_success", &self.delete_on_success)
            .field("sanitize_names", &self.sanitize_names)
            .finish_non_exhaustive()
    }
}

impl UploadEngine {
    /// Creates an engine around a transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        retry_policy: RetryPolicy,
        delete_on_success: bool,
    ) -> Self {
        debug!(
            max_attempts = retry_policy.max_attempts(),
            delete_on_success, "creating upload engine"
        );
        Self {
            transport,
            retry_policy,
            delete_on_success,
            sanitize_names: false,
        }
    }

    /// Creates an engine from the daemon configuration.
    #[must_use]
    pub fn from_config(config: &WatchConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, config.retry_policy(), config.delete_on_success)
            .with_sanitized_names(config.sanitize_names)
    }

    /// Enables whitespace replacement in the name reported to the service.
    #[must_use]
    pub fn with_sanitized_names(mut self, enabled: bool) -> Self {
        self.sanitize_names = enabled;
        self
    }

    /// Processes one dropped file.
    ///
    /// Errors are logged and folded into the returned report; this never fails.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn process(&self, path: &Path) -> ProcessReport {
        let Some(request) = UploadRequest::from_path(path) else {
            info!("skipping unsupported file type");
            return ProcessReport::Skipped {
                path: path.to_path_buf(),
            };
        };
        let request = if self.sanitize_names {
            request.with_sanitized_name()
        } else {
            request
        };
        let kind = request.kind;

        debug!(%kind, display_name = %request.display_name, "uploading");

        let result = with_retry(&self.retry_policy, || self.transport.send(&request)).await;

        match result {
            Ok(outcome) => {
                info!(
                    %kind,
                    detail = outcome.detail.as_deref().unwrap_or_default(),
                    "successfully uploaded"
                );
                let deletion = if self.delete_on_success {
                    delete_source(path).await
                } else {
                    DeletionOutcome::NotRequested
                };
                ProcessReport::Uploaded {
                    path: path.to_path_buf(),
                    kind,
                    outcome,
                    deletion,
                }
            }
            Err(error) => {
                let failure = classify_error(error.last_error());
                warn!(
                    %kind,
                    ?failure,
                    error = %error,
                    "upload failed, leaving file in place"
                );
                ProcessReport::Failed {
                    path: path.to_path_buf(),
                    kind,
                    error,
                }
            }
        }
    }
}

async fn delete_source(path: &Path) -> DeletionOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("deleted file");
            DeletionOutcome::Deleted
        }
        Err(e) => {
            warn!(error = %e, "failed to delete file");
            DeletionOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Scripted {
        Accept,
        TimeOut,
        Reject(&'static str),
        AcceptAndRemoveSource,
    }

    /// Transport that replays a script and counts calls.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Scripted>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: &[Scripted]) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.iter().copied().collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &UploadRequest) -> Result<UploadOutcome, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Scripted::Accept);
            let accepted = UploadOutcome {
                success: true,
                remote_created_at: None,
                detail: None,
            };
            match step {
                Scripted::Accept => Ok(accepted),
                Scripted::TimeOut => Err(UploadError::timeout("http://mock/upload")),
                Scripted::Reject(detail) => Err(UploadError::rejected("http://mock/upload", detail)),
                Scripted::AcceptAndRemoveSource => {
                    std::fs::remove_file(&request.source_path).unwrap();
                    Ok(accepted)
                }
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::with_max_attempts(3)
            .base_delay_of(Duration::from_millis(1))
            .with_jitter(Duration::ZERO)
    }

    fn drop_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"d8:announce0:e").unwrap();
        path
    }

    #[tokio::test]
    async fn test_unrecognized_never_calls_transport() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "notes.txt");
        let transport = ScriptedTransport::new(&[]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), true);

        let report = engine.process(&path).await;

        assert!(report.is_skipped());
        assert_eq!(transport.calls(), 0);
        assert!(path.exists(), "skipped files must not be deleted");
    }

    #[tokio::test]
    async fn test_success_deletes_when_enabled() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "movie.torrent");
        let transport = ScriptedTransport::new(&[Scripted::Accept]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), true);

        let report = engine.process(&path).await;

        assert_eq!(transport.calls(), 1);
        assert!(matches!(
            report,
            ProcessReport::Uploaded {
                deletion: DeletionOutcome::Deleted,
                kind: ContentKind::Torrent,
                ..
            }
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_success_keeps_file_when_disabled() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "movie.torrent");
        let transport = ScriptedTransport::new(&[Scripted::Accept]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), false);

        let report = engine.process(&path).await;

        assert!(matches!(
            report,
            ProcessReport::Uploaded {
                deletion: DeletionOutcome::NotRequested,
                ..
            }
        ));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "bad.torrent");
        let transport = ScriptedTransport::new(&[Scripted::Reject("invalid torrent")]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), true);

        let report = engine.process(&path).await;

        assert_eq!(transport.calls(), 1);
        let ProcessReport::Failed { error, .. } = report else {
            panic!("expected failure, got {report:?}");
        };
        assert!(!error.is_exhausted());
        assert!(error.to_string().contains("invalid torrent"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_timeouts_then_success_retries() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "show.nzb");
        let transport =
            ScriptedTransport::new(&[Scripted::TimeOut, Scripted::TimeOut, Scripted::Accept]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), false);

        let report = engine.process(&path).await;

        assert_eq!(transport.calls(), 3);
        assert!(report.is_uploaded());
    }

    #[tokio::test]
    async fn test_timeouts_exhaust_budget() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "show.nzb");
        let transport = ScriptedTransport::new(&[Scripted::TimeOut; 5]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), true);

        let report = engine.process(&path).await;

        assert_eq!(transport.calls(), 3);
        let ProcessReport::Failed { error, .. } = report else {
            panic!("expected failure, got {report:?}");
        };
        assert!(error.is_exhausted());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_deletion_failure_keeps_upload_success() {
        let dir = TempDir::new().unwrap();
        let path = drop_file(&dir, "movie.torrent");
        let transport = ScriptedTransport::new(&[Scripted::AcceptAndRemoveSource]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), true);

        let report = engine.process(&path).await;

        assert!(matches!(
            report,
            ProcessReport::Uploaded {
                deletion: DeletionOutcome::Failed { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_vanished_source_reports_deletion_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vanished.torrent");
        let transport = ScriptedTransport::new(&[Scripted::Accept]);
        let engine = UploadEngine::new(transport.clone(), fast_policy(), true);

        // The scripted transport never reads the file, so this succeeds and the
        // delete step reports the missing file instead.
        let report = engine.process(&path).await;
        assert!(matches!(
            report,
            ProcessReport::Uploaded {
                deletion: DeletionOutcome::Failed { .. },
                ..
            }
        ));
    }
}
