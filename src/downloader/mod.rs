pub mod destination;


use crate::error::{GrabError, Result};
use crate::fetch::{BodyError, Fetcher};
use crate::filter::ReferenceFilter;
use crate::parsers::{self, DocumentType};
use crate::resolver::{BaseUrl, ResolvedReference};
use crate::results::{BatchResult, DownloadOutcome, status_line};
use crate::utils::candidate_filename;
use destination::Destination;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

/// Why a single item failed, before it is folded into its outcome
#[derive(Debug)]
enum ItemFailure {
    Status { code: u16, reason: &'static str },
    Timeout(Duration),
    Transport(reqwest::Error),
    Io(std::io::Error),
}

impl ItemFailure {
    fn from_transport(error: reqwest::Error, limit: Duration) -> Self {
        if error.is_timeout() {
            ItemFailure::Timeout(limit)
        } else {
            ItemFailure::Transport(error)
        }
    }

    fn from_body(error: BodyError, limit: Duration) -> Self {
        match error {
            BodyError::Transport(e) => Self::from_transport(e, limit),
            BodyError::Io(e) => ItemFailure::Io(e),
        }
    }

    fn into_outcome(self, source_url: String) -> DownloadOutcome {
        match self {
            ItemFailure::Status { code, reason } => {
                DownloadOutcome::failed_status(source_url, code, reason)
            }
            ItemFailure::Timeout(limit) => DownloadOutcome::failed_exception(
                source_url,
                format!("timed out after {}s", limit.as_secs_f64()),
            ),
            ItemFailure::Transport(e) => {
                DownloadOutcome::failed_exception(source_url, format!("request failed: {}", e))
            }
            ItemFailure::Io(e) => {
                let reason = format!("could not write file: {}", e);
                DownloadOutcome::failed_exception(source_url, reason)
            }
        }
    }
}

/// Drives one run: fetch the page, extract and resolve image references,
/// then download every image independently.
#[derive(Debug)]
pub struct Downloader {
    fetcher: Fetcher,
    filter: ReferenceFilter,
    max_concurrency: usize,
}

impl Downloader {
    pub fn new(fetcher: Fetcher, filter: ReferenceFilter, max_concurrency: usize) -> Self {
        Self {
            fetcher,
            filter,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Download every image referenced by the page at `base_url` into `destination`.
    ///
    /// Fails only for problems with the run itself (invalid base URL, page
    /// unreachable, destination not creatable). A page that is not HTML yields
    /// an empty batch. Per-image failures are recorded in the batch and never
    /// stop the remaining downloads.
    pub async fn run(&self, base_url: &str, destination: impl AsRef<Path>) -> Result<BatchResult> {
        let base = BaseUrl::parse(base_url)?;
        ::log::info!("Grabbing images from {}", base);

        let Some(html) = self.fetch_page(&base).await? else {
            return Ok(BatchResult::default());
        };

        let references = parsers::extract_references(&html);
        ::log::info!("Found {} image references in {}", references.len(), base);

        let urls = self.resolve_all(&base, &references);
        let destination = Destination::prepare(destination.as_ref()).await?;

        let outcomes = self.download_all(&urls, &destination).await;
        let batch = BatchResult::new(outcomes);

        ::log::info!(
            "Finished {}: {} downloaded, {} failed",
            base,
            batch.succeeded().count(),
            batch.failed().count()
        );
        Ok(batch)
    }

    /// Fetches the page text, or `None` when the page is not HTML
    async fn fetch_page(&self, base: &BaseUrl) -> Result<Option<String>> {
        let response = self
            .fetcher
            .fetch(base.as_str())
            .await
            .map_err(|source| GrabError::PageFetch {
                url: base.to_string(),
                source,
            })?;

        if !response.is_success() {
            return Err(GrabError::PageStatus {
                url: base.to_string(),
                status: status_line(response.status_code(), response.reason_phrase()),
            });
        }

        let document_type = DocumentType::from_content_type(response.content_type());
        if !document_type.should_extract_references() {
            ::log::warn!(
                "{} is not an HTML document ({:?}), nothing to extract",
                base,
                response.content_type()
            );
            return Ok(None);
        }

        let html = response.text().await.map_err(|source| GrabError::PageFetch {
            url: base.to_string(),
            source,
        })?;
        Ok(Some(html))
    }

    /// Turns raw references into the absolute URLs that will be downloaded
    pub fn resolve_all(&self, base: &BaseUrl, references: &[String]) -> Vec<String> {
        references
            .iter()
            .filter_map(|raw| self.filter.normalize_reference(raw))
            .map(|raw| ResolvedReference::new(base, raw).absolute_url())
            .filter(|url| self.filter.should_download(url))
            .collect()
    }

    /// Downloads with bounded concurrency; outcomes keep the order of `urls`
    async fn download_all(
        &self,
        urls: &[String],
        destination: &Destination,
    ) -> Vec<DownloadOutcome> {
        stream::iter(urls.iter().enumerate())
            .map(|(index, url)| self.download_one(index, url, destination))
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn download_one(
        &self,
        index: usize,
        url: &str,
        destination: &Destination,
    ) -> DownloadOutcome {
        ::log::trace!("Item {} pending: {}", index, url);

        match self.fetch_to_disk(index, url, destination).await {
            Ok((local_path, byte_size)) => {
                ::log::info!(
                    "Downloaded {} to {} ({} bytes)",
                    url,
                    local_path.display(),
                    byte_size
                );
                DownloadOutcome::succeeded(url.to_string(), local_path, byte_size)
            }
            Err(failure) => {
                let outcome = failure.into_outcome(url.to_string());
                ::log::warn!(
                    "Failed to download {}: {}",
                    url,
                    outcome.failure_reason().unwrap_or_default()
                );
                outcome
            }
        }
    }

    async fn fetch_to_disk(
        &self,
        index: usize,
        url: &str,
        destination: &Destination,
    ) -> std::result::Result<(PathBuf, u64), ItemFailure> {
        let limit = self.fetcher.timeout();
        ::log::debug!("Item {} fetching: {}", index, url);

        let response = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| ItemFailure::from_transport(e, limit))?;

        if !response.is_success() {
            return Err(ItemFailure::Status {
                code: response.status_code(),
                reason: response.reason_phrase(),
            });
        }

        let declared_length = response.content_length();
        let name = candidate_filename(url);
        let (path, mut file) = destination
            .create_unique(&name)
            .await
            .map_err(ItemFailure::Io)?;

        let written = match timeout(limit, response.write_body_to(&mut file)).await {
            Ok(Ok(written)) => written,
            Ok(Err(e)) => {
                drop(file);
                destination.discard(&path).await;
                return Err(ItemFailure::from_body(e, limit));
            }
            Err(_) => {
                drop(file);
                destination.discard(&path).await;
                return Err(ItemFailure::Timeout(limit));
            }
        };

        if let Some(declared) = declared_length {
            if declared != written {
                ::log::debug!(
                    "{} declared {} bytes but {} were written",
                    url,
                    declared,
                    written
                );
            }
        }

        Ok((path, written))
    }
}
