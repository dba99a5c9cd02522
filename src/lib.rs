// Re-export modules
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod parsers;
pub mod resolver;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::GrabberConfig;
pub use downloader::Downloader;
pub use error::{GrabError, Result};
pub use resolver::{BaseUrl, resolve};
pub use results::{BatchResult, DownloadOutcome, DownloadStatus};

use std::path::PathBuf;

/// Main builder for grabbing every image referenced by one page
pub struct ImageGrab {
    url: String,
    destination: PathBuf,
    config: GrabberConfig,
    client: Option<reqwest::Client>,
}

impl ImageGrab {
    /// Create a new builder for the page at `url`, saving into `destination`
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            config: GrabberConfig::default(),
            client: None,
        }
    }

    /// Set the maximum number of concurrent downloads
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.request_timeout_secs = timeout_seconds;
        self
    }

    /// Add a regex an image URL must match (any of them) to be downloaded
    pub fn with_include_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.filter.include_patterns.push(pattern.into());
        self
    }

    /// Add a regex that keeps matching image URLs from being downloaded
    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.filter.exclude_patterns.push(pattern.into());
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: GrabberConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = GrabberConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = GrabberConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Reuse an existing HTTP client instead of building one from the configuration
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(&self) -> &GrabberConfig {
        &self.config
    }

    /// Build the downloader described by this builder
    pub fn build(&self) -> Result<Downloader> {
        self.config.validate()?;
        let fetcher = match &self.client {
            Some(client) => {
                fetch::Fetcher::from_client(client.clone(), self.config.request_timeout())
            }
            None => fetch::Fetcher::new(&self.config)?,
        };
        let filter = filter::ReferenceFilter::new(&self.config.filter)?;
        Ok(Downloader::new(fetcher, filter, self.config.max_concurrency))
    }

    /// Fetch the page and download its images
    pub async fn run(self) -> Result<BatchResult> {
        // Reject a bad URL before touching the network or the filesystem
        BaseUrl::parse(&self.url)?;
        let downloader = self.build()?;
        downloader.run(&self.url, &self.destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_config() {
        let grab = ImageGrab::new("https://example.com", "/tmp/images")
            .with_max_concurrency(9)
            .with_request_timeout(3)
            .with_include_pattern(r"\.png$")
            .with_exclude_pattern("/ads/");

        let config = grab.config();
        assert_eq!(config.max_concurrency, 9);
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.filter.include_patterns, vec![r"\.png$"]);
        assert_eq!(config.filter.exclude_patterns, vec!["/ads/"]);
    }

    #[test]
    fn test_build_rejects_bad_pattern() {
        let grab = ImageGrab::new("https://example.com", "/tmp/images").with_exclude_pattern("(");
        assert!(matches!(grab.build(), Err(GrabError::Pattern(_))));
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let grab = ImageGrab::new("https://example.com", "/tmp/images").with_request_timeout(0);
        assert!(matches!(grab.build(), Err(GrabError::Config(_))));

        let grab = ImageGrab::new("https://example.com", "/tmp/images")
            .with_client(reqwest::Client::new())
            .with_request_timeout(0);
        assert!(matches!(grab.build(), Err(GrabError::Config(_))));
    }

    #[tokio::test]
    async fn test_run_rejects_relative_url() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let result = ImageGrab::new("images/index.html", &target).run().await;
        assert!(matches!(result, Err(GrabError::InvalidArgument(_))));
        assert!(!target.exists());
    }

    #[test]
    fn test_with_config_str() {
        let grab = ImageGrab::new("https://example.com", "out")
            .with_config_str(r#"{"max_concurrency": 2}"#)
            .unwrap();
        assert_eq!(grab.config().max_concurrency, 2);
        assert_eq!(grab.config().request_timeout_secs, 30);
    }
}
