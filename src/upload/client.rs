//! HTTP transport for submitting dropped files to the service.
//!
//! This module provides the [`Transport`] trait and [`ApiClient`], its
//! reqwest-backed implementation. One call to [`Transport::send`] is one
//! network round trip; retries belong to the caller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Body, Client};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, MAGNET_ENDPOINT, TORRENT_ENDPOINT, USENET_ENDPOINT};
use super::error::UploadError;
use crate::classify::{ContentKind, UploadRequest};
use crate::config::ServiceSettings;
use crate::user_agent;

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Always true for outcomes returned through `Ok`.
    pub success: bool,
    /// Creation time reported by the service, when present.
    pub remote_created_at: Option<DateTime<Utc>>,
    /// Detail text returned by the service, when non-empty.
    pub detail: Option<String>,
}

/// Sends one upload request to the remote service.
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Arc<dyn Transport>`, which lets the engine be driven by a mock in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submits `request` in a single round trip.
    async fn send(&self, request: &UploadRequest) -> Result<UploadOutcome, UploadError>;
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl ApiResponse {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.data.as_ref()?.get("created_at")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Authenticated HTTP client for the cloud-download service.
///
/// Created once at startup and shared across uploads; the underlying reqwest
/// client pools connections.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    settings: ServiceSettings,
}

impl ApiClient {
    /// Creates a client for the given service settings.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(settings: ServiceSettings) -> Result<Self, UploadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(UploadError::ClientBuild)?;
        Ok(Self { client, settings })
    }

    /// Uploads a `.torrent` payload, asking the service to seed and allowing zips.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] on IO, transport, status, or response failures.
    #[instrument(skip(self, request), fields(path = %request.source_path.display()))]
    pub async fn create_torrent(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        let form = Form::new()
            .part("file", file_part(request).await?)
            .text("seed", "1")
            .text("allow_zip", "true");

        self.submit(TORRENT_ENDPOINT, form).await
    }

    /// Submits the magnet URI stored in a `.magnet` file.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::EmptyDescriptor`] for an empty file, otherwise the
    /// same errors as [`create_torrent`](Self::create_torrent).
    #[instrument(skip(self, request), fields(path = %request.source_path.display()))]
    pub async fn create_transfer(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        let raw = tokio::fs::read_to_string(&request.source_path)
            .await
            .map_err(|e| UploadError::io(&request.source_path, e))?;
        let link = raw.trim();
        if link.is_empty() {
            return Err(UploadError::empty_descriptor(&request.source_path));
        }

        let form = self.with_folder_id(Form::new().text("magnet", link.to_string()));
        self.submit(MAGNET_ENDPOINT, form).await
    }

    /// Uploads an NZB payload under the request's display name.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`create_torrent`](Self::create_torrent).
    #[instrument(skip(self, request), fields(path = %request.source_path.display()))]
    pub async fn create_usenet_download(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        let form = Form::new()
            .part("file", file_part(request).await?)
            .text("name", request.display_name.clone());

        self.submit(USENET_ENDPOINT, self.with_folder_id(form)).await
    }

    fn with_folder_id(&self, form: Form) -> Form {
        match &self.settings.folder_id {
            Some(folder_id) => form.text("folder_id", folder_id.clone()),
            None => form,
        }
    }

    async fn submit(&self, endpoint: &str, form: Form) -> Result<UploadOutcome, UploadError> {
        let url = self.settings.endpoint(endpoint);
        debug!(url = %url, "submitting");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.settings.credential.expose())
            .timeout(self.settings.call_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::unexpected_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::from_reqwest(&url, e))?;
        let parsed: ApiResponse =
            serde_json::from_slice(&body).map_err(|e| UploadError::malformed(&url, e))?;

        let detail = parsed.detail.clone().filter(|d| !d.is_empty());
        if !parsed.success {
            return Err(UploadError::rejected(url, detail.unwrap_or_default()));
        }

        Ok(UploadOutcome {
            success: true,
            remote_created_at: parsed.created_at(),
            detail,
        })
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: &UploadRequest) -> Result<UploadOutcome, UploadError> {
        match request.kind {
            ContentKind::Torrent => self.create_torrent(request).await,
            ContentKind::Magnet => self.create_transfer(request).await,
            ContentKind::Usenet => self.create_usenet_download(request).await,
            ContentKind::Unrecognized => Err(UploadError::unsupported(&request.source_path)),
        }
    }
}

/// Streams the source file as the multipart `file` part.
///
/// Opened per attempt, so a retry re-reads the file from the start.
async fn file_part(request: &UploadRequest) -> Result<Part, UploadError> {
    let path = request.source_path.as_path();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| UploadError::io(path, e))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| UploadError::io(path, e))?
        .len();
    Ok(Part::stream_with_length(Body::from(file), len).file_name(request.file_name()))
}
