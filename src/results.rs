use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Terminal state of a single image download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadStatus {
    /// The image was written to disk
    Succeeded {
        /// Final on-disk path
        local_path: PathBuf,
        /// Number of bytes written
        byte_size: u64,
    },

    /// The server answered with a non-success status
    FailedStatus {
        /// HTTP status code
        code: u16,
        /// Reason phrase for the status code
        reason: String,
    },

    /// Transport, timeout or disk failure
    FailedException {
        /// Human-readable description of the failure
        reason: String,
    },
}

/// Outcome of one attempted download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Absolute URL that was attempted
    pub source_url: String,

    /// How the attempt ended
    pub status: DownloadStatus,
}

impl DownloadOutcome {
    /// Create a successful outcome
    pub fn succeeded(source_url: String, local_path: PathBuf, byte_size: u64) -> Self {
        Self {
            source_url,
            status: DownloadStatus::Succeeded {
                local_path,
                byte_size,
            },
        }
    }

    /// Create an outcome for a non-success HTTP status
    pub fn failed_status(source_url: String, code: u16, reason: impl Into<String>) -> Self {
        Self {
            source_url,
            status: DownloadStatus::FailedStatus {
                code,
                reason: reason.into(),
            },
        }
    }

    /// Create an outcome for any other failure
    pub fn failed_exception(source_url: String, reason: impl Into<String>) -> Self {
        Self {
            source_url,
            status: DownloadStatus::FailedException {
                reason: reason.into(),
            },
        }
    }

    pub fn was_successful(&self) -> bool {
        matches!(self.status, DownloadStatus::Succeeded { .. })
    }

    /// Why the attempt failed, or `None` on success
    pub fn failure_reason(&self) -> Option<String> {
        match &self.status {
            DownloadStatus::Succeeded { .. } => None,
            DownloadStatus::FailedStatus { code, reason } => Some(status_line(*code, reason)),
            DownloadStatus::FailedException { reason } => Some(reason.clone()),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match &self.status {
            DownloadStatus::Succeeded { local_path, .. } => Some(local_path),
            _ => None,
        }
    }

    pub fn byte_size(&self) -> Option<u64> {
        match &self.status {
            DownloadStatus::Succeeded { byte_size, .. } => Some(*byte_size),
            _ => None,
        }
    }
}

/// `404 Not Found`, or just `599` for codes without a reason phrase
pub fn status_line(code: u16, reason: &str) -> String {
    if reason.is_empty() {
        code.to_string()
    } else {
        format!("{} {}", code, reason)
    }
}

/// All outcomes of one run, in extraction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult {
    outcomes: Vec<DownloadOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<DownloadOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DownloadOutcome> {
        self.outcomes.iter()
    }

    /// Outcomes that wrote a file
    pub fn succeeded(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| o.was_successful())
    }

    /// Outcomes that carry a failure reason
    pub fn failed(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.was_successful())
    }

    pub fn into_outcomes(self) -> Vec<DownloadOutcome> {
        self.outcomes
    }
}

impl IntoIterator for BatchResult {
    type Item = DownloadOutcome;
    type IntoIter = std::vec::IntoIter<DownloadOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a DownloadOutcome;
    type IntoIter = std::slice::Iter<'a, DownloadOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
