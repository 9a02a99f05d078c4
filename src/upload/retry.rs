//! Retry logic with exponential backoff for timeout-class failures.
//!
//! This module provides the [`RetryPolicy`] and [`FailureType`] types for
//! classifying upload errors, and [`with_retry`], which re-invokes any
//! zero-argument fallible async operation under a policy.
//!
//! # Overview
//!
//! When an attempt fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - The call exceeded its deadline; may succeed on retry
//! - [`FailureType::Permanent`] - Rejections, bad statuses, malformed responses, IO
//! - [`FailureType::NeedsAuth`] - The service refused the credential (401/403)
//!
//! Only transient failures are retried. Delays double from the base delay,
//! are capped at a maximum, and carry a small random jitter.
//!
//! # Example
//!
//! ```
//! use dropwatch_core::upload::{FailureType, RetryDecision, RetryPolicy, UploadError, classify_error};
//!
//! let policy = RetryPolicy::default();
//! let error = UploadError::timeout("https://api.torbox.app/v1/api/torrents/createtorrent");
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::UploadError;

/// Default maximum attempts per upload.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (5 seconds).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);

/// Default maximum delay cap (60 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Default maximum jitter added to delays (250ms).
const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(250);

/// Classification of upload failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The call exceeded its deadline. Eligible for retry.
    Transient,

    /// Retrying would not change the outcome.
    Permanent,

    /// The credential was refused.
    NeedsAuth,
}

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Errors that can be classified for retry decisions.
pub trait ClassifyFailure {
    /// Returns the failure class of this error.
    fn failure_type(&self) -> FailureType;
}

impl ClassifyFailure for UploadError {
    fn failure_type(&self) -> FailureType {
        classify_error(self)
    }
}

/// Terminal outcome of [`with_retry`] when the operation never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    #[error("failed to upload after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: E,
    },

    /// A non-retryable error, returned as-is.
    #[error("{0}")]
    Aborted(E),
}

impl<E> RetryError<E> {
    /// Returns the underlying error from the last attempt.
    #[must_use]
    pub fn last_error(&self) -> &E {
        match self {
            Self::Exhausted { last, .. } | Self::Aborted(last) => last,
        }
    }

    /// Consumes the error, returning the underlying error from the last attempt.
    #[must_use]
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } | Self::Aborted(last) => last,
        }
    }

    /// Returns true if the attempt budget was used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `base_delay`: 5 seconds
/// - `max_delay`: 60 seconds
/// - `backoff_multiplier`: 2.0
/// - `max_jitter`: 250 milliseconds
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
/// ```
///
/// With defaults, delays are approximately: 5s, 10s (before hitting max attempts).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay before the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f32,

    /// Upper bound of the random jitter added to each delay.
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (clamped to >= 1)
    /// * `base_delay` - Delay before the first retry
    /// * `max_delay` - Maximum delay cap
    /// * `backoff_multiplier` - Multiplier for exponential increase
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Replaces the base delay.
    #[must_use]
    pub fn base_delay_of(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Replaces the jitter bound. `Duration::ZERO` disables jitter.
    #[must_use]
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the first retry.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Determines whether to retry a failed attempt.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::NeedsAuth => {
                return RetryDecision::DoNotRetry {
                    reason: "credential refused - check the API key".to_string(),
                };
            }
            FailureType::Transient => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Formula: `min(base_delay * multiplier^(attempt - 1), max_delay) + jitter`
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay_ms = base_ms * multiplier.powi(exponent);

        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.calculate_jitter()
    }

    fn calculate_jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=max_ms);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies an upload error into a failure type for retry decisions.
///
/// | Error | Type | Rationale |
/// |-------|------|-----------|
/// | Timeout | Transient | The deadline may be met next time |
/// | `UnexpectedStatus` 401/403 | `NeedsAuth` | Credential refused |
/// | `UnexpectedStatus` (other) | Permanent | Non-2xx is a hard failure |
/// | Rejected | Permanent | The service declined explicitly |
/// | `MalformedResponse` | Permanent | Undecodable body |
/// | Network | Permanent | Not a deadline expiry |
/// | Io / `EmptyDescriptor` / Unsupported | Permanent | Local problem |
#[must_use]
pub fn classify_error(error: &UploadError) -> FailureType {
    match error {
        UploadError::Timeout { .. } => FailureType::Transient,
        UploadError::UnexpectedStatus { status, .. } if matches!(status, 401 | 403) => {
            FailureType::NeedsAuth
        }
        UploadError::UnexpectedStatus { .. }
        | UploadError::Rejected { .. }
        | UploadError::MalformedResponse { .. }
        | UploadError::Network { .. }
        | UploadError::Io { .. }
        | UploadError::EmptyDescriptor { .. }
        | UploadError::Unsupported { .. }
        | UploadError::ClientBuild(_) => FailureType::Permanent,
    }
}

/// Runs `operation` under `policy`, retrying timeout-class failures.
///
/// The operation is invoked at most `policy.max_attempts()` times. A
/// non-retryable error ends the sequence immediately as
/// [`RetryError::Aborted`]; running out of attempts yields
/// [`RetryError::Exhausted`] naming the attempt count and last error.
///
/// # Errors
///
/// Returns [`RetryError`] when no attempt succeeded.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyFailure + fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!(attempt, "attempting operation");

        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let failure_type = error.failure_type();
        match policy.should_retry(failure_type, attempt) {
            RetryDecision::Retry {
                delay,
                attempt: next_attempt,
            } => {
                info!(
                    attempt = next_attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "attempt timed out, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(attempt, %reason, "not retrying");
                return Err(if failure_type == FailureType::Transient {
                    RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    }
                } else {
                    RetryError::Aborted(error)
                });
            }
        }
    }
}
