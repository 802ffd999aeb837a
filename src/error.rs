//! Error types for the digest pipeline
//!
//! - `FetchError`: one feed could not be fetched or parsed (non-fatal)
//! - `PriorReportError`: the previous report exists but cannot be read (fatal)

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching URL {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error parsing feed from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: rss::Error,
    },
}

impl FetchError {
    /// URL of the endpoint that failed
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::Parse { url, .. } => url,
        }
    }
}

#[derive(Debug, Error)]
pub enum PriorReportError {
    #[error("Error reading prior report {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
