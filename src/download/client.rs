//! HTTP client wrapper for catalogue pages and chapter artifacts.
//!
//! This module provides the `HttpClient` struct which applies the client
//! identity header, per-request timeouts and the retry policy to every
//! request, and streams artifact bodies straight to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::ProgressBar;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::progress::complete;
use super::retry::{RetryPolicy, run_with_retry};
use crate::user_agent;

/// Transport settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub read_timeout: Duration,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Retrieves one catalogue page as text.
///
/// Implemented by [`HttpClient`]; tests substitute canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page body at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on network failure or a non-success status.
    async fn fetch_page(&self, url: &Url) -> Result<String, DownloadError>;
}

/// A body streamed to disk, with the server-declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Where the body was written.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// Raw `Content-Type` header value, if the server sent one.
    pub content_type: Option<String>,
}

/// HTTP client shared by the crawler and the artifact downloader.
///
/// Created once per run and reused so requests share a connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Builds a client from the run's transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the TLS backend cannot be initialised.
    pub fn new(settings: &HttpSettings) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.read_timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| DownloadError::Client { source })?;
        Ok(Self {
            client,
            retry: RetryPolicy::with_max_retries(settings.max_retries),
        })
    }

    /// Fetches `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when every permitted attempt fails.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &Url) -> Result<String, DownloadError> {
        let url_str = url.as_str();
        run_with_retry(&self.retry, url_str, move || async move {
            let response = self.send_get(url_str).await?;
            response
                .text()
                .await
                .map_err(|e| DownloadError::from_reqwest(url_str, e))
        })
        .await
    }

    /// Streams the body at `url` into `destination`, updating `progress` per chunk.
    ///
    /// A failed attempt removes the partial file before retrying or returning.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on network, status, or file system failure.
    #[instrument(skip(self, progress), fields(url = %url, dest = %destination.display()))]
    pub async fn download_to_path(
        &self,
        url: &Url,
        destination: &Path,
        progress: &ProgressBar,
    ) -> Result<DownloadedFile, DownloadError> {
        let url_str = url.as_str();
        run_with_retry(&self.retry, url_str, move || async move {
            let result = self.download_once(url_str, destination, progress).await;
            if result.is_err() {
                debug!(path = %destination.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(destination).await;
            }
            result
        })
        .await
    }

    async fn download_once(
        &self,
        url: &str,
        destination: &Path,
        progress: &ProgressBar,
    ) -> Result<DownloadedFile, DownloadError> {
        let response = self.send_get(url).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        progress.set_position(0);
        if let Some(total) = content_length {
            progress.set_length(total);
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;
        let bytes = stream_to_file(&mut file, response, url, destination, progress).await?;
        complete(progress, bytes);

        info!(
            path = %destination.display(),
            bytes,
            content_type = content_type.as_deref().unwrap_or("unknown"),
            "download complete"
        );

        Ok(DownloadedFile {
            path: destination.to_path_buf(),
            bytes,
            content_type,
        })
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &Url) -> Result<String, DownloadError> {
        self.fetch_text(url).await
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    progress: &ProgressBar,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
        progress.set_position(bytes_written);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
