use crate::config::GrabberConfig;
use crate::error::{GrabError, Result};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Reusable HTTP client handle shared by the page fetch and every image download.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    /// Build a client with the configured timeout and user agent
    pub fn new(config: &GrabberConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(GrabError::Client)?;

        Ok(Self { client, timeout })
    }

    /// Wrap an existing client. `timeout` bounds each fetch issued through it.
    pub fn from_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a GET request. Non-success statuses are returned as responses,
    /// not errors.
    pub async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, reqwest::Error> {
        ::log::trace!("GET {}", url);
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        Ok(FetchResponse { inner: response })
    }
}

/// Failure while streaming a response body to a writer
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("transfer failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Status, headers and body of a fetched resource
#[derive(Debug)]
pub struct FetchResponse {
    inner: reqwest::Response,
}

impl FetchResponse {
    pub fn status_code(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Canonical reason phrase for the status, empty for unknown codes
    pub fn reason_phrase(&self) -> &'static str {
        self.inner.status().canonical_reason().unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Declared `Content-Type`, if present and valid text
    pub fn content_type(&self) -> Option<&str> {
        self.inner
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Declared `Content-Length`, if any
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    /// Read the whole body as text
    pub async fn text(self) -> std::result::Result<String, reqwest::Error> {
        self.inner.text().await
    }

    /// Stream the body chunk by chunk into `writer`, returning the number of
    /// bytes written.
    pub async fn write_body_to<W>(mut self, writer: &mut W) -> std::result::Result<u64, BodyError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written: u64 = 0;
        while let Some(chunk) = self.inner.chunk().await? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }
}
