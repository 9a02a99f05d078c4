//! Error types for the upload module.
//!
//! Each variant carries the endpoint or path it concerns. Deadline expiry is a
//! variant of its own ([`UploadError::Timeout`]), tagged where the request is
//! sent, so retry eligibility never depends on error text.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while submitting a file to the service.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Reading the source file failed.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A magnet file contained no descriptor.
    #[error("no magnet link found in {path}")]
    EmptyDescriptor {
        /// The empty file.
        path: PathBuf,
    },

    /// The file's kind has no submission endpoint.
    #[error("unsupported file type: {path}")]
    Unsupported {
        /// The unsupported file.
        path: PathBuf,
    },

    /// The call exceeded its deadline.
    #[error("timeout calling {url}")]
    Timeout {
        /// The endpoint that timed out.
        url: String,
    },

    /// Any other network-level failure (DNS, connection refused, TLS).
    #[error("network error calling {url}: {source}")]
    Network {
        /// The endpoint that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("unexpected status code {status} from {url}")]
    UnexpectedStatus {
        /// The endpoint that answered.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The service answered 2xx but declined the submission.
    #[error("service rejected upload: {detail}")]
    Rejected {
        /// The endpoint that answered.
        url: String,
        /// Detail text returned by the service.
        detail: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("malformed response from {url}: {source}")]
    MalformedResponse {
        /// The endpoint that answered.
        url: String,
        /// The decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl UploadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an empty-descriptor error.
    pub fn empty_descriptor(path: impl Into<PathBuf>) -> Self {
        Self::EmptyDescriptor { path: path.into() }
    }

    /// Creates an unsupported-kind error.
    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        Self::Unsupported { path: path.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an unexpected-status error.
    pub fn unexpected_status(url: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a rejection error from the service's detail text.
    pub fn rejected(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Rejected {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            source,
        }
    }

    /// Maps a reqwest transport failure, separating deadline expiry.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Returns true if the failure was the call exceeding its deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_timeout_display() {
        let error = UploadError::timeout("https://api.example.com/v1/api/torrents/createtorrent");
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("createtorrent"), "Expected URL in: {msg}");
        assert!(error.is_timeout());
    }

    #[test]
    fn test_upload_error_status_display() {
        let error = UploadError::unexpected_status("https://api.example.com/x", 502);
        let msg = error.to_string();
        assert!(msg.contains("502"), "Expected '502' in: {msg}");
        assert!(!error.is_timeout());
    }

    #[test]
    fn test_upload_error_rejected_carries_detail() {
        let error = UploadError::rejected("https://api.example.com/x", "invalid torrent");
        assert!(error.to_string().contains("invalid torrent"));
    }

    #[test]
    fn test_upload_error_malformed_display() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = UploadError::malformed("https://api.example.com/x", source);
        assert!(error.to_string().contains("malformed response"));
    }

    #[test]
    fn test_upload_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = UploadError::io("/watch/movie.torrent", io_error);
        assert!(error.to_string().contains("/watch/movie.torrent"));
    }

    #[test]
    fn test_upload_error_empty_descriptor_display() {
        let error = UploadError::empty_descriptor("/watch/link.magnet");
        assert!(error.to_string().contains("link.magnet"));
    }
}
