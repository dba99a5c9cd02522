use thiserror::Error;

/// Result type alias for image-grab operations
pub type Result<T> = std::result::Result<T, GrabError>;

/// Errors that abort a whole run.
///
/// Failures of individual images never show up here; they are recorded in the
/// corresponding [`crate::results::DownloadOutcome`] instead.
#[derive(Debug, Error)]
pub enum GrabError {
    /// The base URL is not an absolute http(s) URL with a host
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The page itself could not be fetched
    #[error("failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page answered with a non-success status
    #[error("page {url} returned {status}")]
    PageStatus { url: String, status: String },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A filter pattern did not compile
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration could not be read, parsed or validated
    #[error("configuration error: {0}")]
    Config(String),

    /// The destination directory could not be created
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
