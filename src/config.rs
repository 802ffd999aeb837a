use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Prefix the title links point at; the item GUID is appended to it
    #[serde(default = "default_reader_url")]
    pub reader_url: String,
    /// Previous report, used only to decide which items are new
    #[serde(default = "default_prior_report")]
    pub prior_report: PathBuf,
    /// Pause between consecutive feed requests, in seconds
    #[serde(default = "default_fetch_delay")]
    pub fetch_delay_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
    pub feeds: Vec<FeedConfig>,
}

fn default_reader_url() -> String {
    "https://freedium.cfd/".to_string()
}

fn default_prior_report() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_fetch_delay() -> u64 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_title_length() -> usize {
    65
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub url: String,
    /// Overrides the tag derived from the URL
    #[serde(default)]
    pub tag: Option<String>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn endpoints(&self) -> Vec<FeedEndpoint> {
        self.feeds
            .iter()
            .map(|feed| match &feed.tag {
                Some(tag) => FeedEndpoint::with_tag(&feed.url, tag),
                None => FeedEndpoint::new(&feed.url),
            })
            .collect()
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_secs(self.fetch_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// One feed to poll: its URL and the short tag shown in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoint {
    pub url: String,
    pub tag: String,
}

impl FeedEndpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            tag: tag_from_url(url),
        }
    }

    pub fn with_tag(url: &str, tag: &str) -> Self {
        Self {
            url: url.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// Last non-empty path segment of the URL, e.g. `security` for
/// `https://medium.com/feed/tag/security`.
pub fn tag_from_url(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return segment.to_string();
        }
    }

    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
