use std::time::Duration;

use reqwest::Client;
use rss::Channel;
use tracing::{info, warn};

use crate::config::FeedEndpoint;
use crate::error::FetchError;

/// One item as read from a feed, before aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub guid: String,
    /// Publish timestamp exactly as it appears in `<pubDate>`
    pub pub_date: String,
}

impl RawItem {
    pub fn new(title: &str, guid: &str, pub_date: &str) -> Self {
        Self {
            title: title.to_string(),
            guid: guid.to_string(),
            pub_date: pub_date.to_string(),
        }
    }
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("FeedDigest/1.0 (RSS Digest)")
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, feed: &FeedEndpoint) -> Result<Vec<RawItem>, FetchError> {
        info!("Fetching feed: {} ({})", feed.tag, feed.url);

        let transport = |source: reqwest::Error| FetchError::Transport {
            url: feed.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&feed.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;
        let bytes = response.bytes().await.map_err(transport)?;

        let items = Self::parse_items(&bytes).map_err(|source| FetchError::Parse {
            url: feed.url.clone(),
            source,
        })?;

        info!("Read {} items from feed '{}'", items.len(), feed.tag);
        Ok(items)
    }

    /// Parse an RSS document into raw items.
    ///
    /// Items without a `<guid>` have nothing to aggregate on and are dropped.
    pub fn parse_items(xml_bytes: &[u8]) -> Result<Vec<RawItem>, rss::Error> {
        let channel = Channel::read_from(xml_bytes)?;

        let items = channel
            .items()
            .iter()
            .filter_map(|item| {
                let title = item.title().unwrap_or("Untitled");
                let Some(guid) = item.guid().map(|g| g.value()) else {
                    warn!("Skipping item with no guid: {}", title);
                    return None;
                };
                Some(RawItem::new(title, guid, item.pub_date().unwrap_or_default()))
            })
            .collect();

        Ok(items)
    }
}
