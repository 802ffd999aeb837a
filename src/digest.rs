use std::time::Duration;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::aggregator::{AggregatedEntry, Aggregator};
use crate::config::{Config, FeedEndpoint};
use crate::fetcher::Fetcher;
use crate::prior_report::PriorReport;
use crate::ranker::rank;
use crate::renderer::Renderer;

/// Outcome of one pass over the feed list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub fetched: usize,
    pub failed: usize,
}

/// Fetch every feed in order and fold the items into `aggregator`.
///
/// A failed feed is logged and skipped. `delay` is slept between
/// consecutive requests to go easy on the feed host.
pub async fn collect(
    fetcher: &Fetcher,
    feeds: &[FeedEndpoint],
    delay: Duration,
    aggregator: &mut Aggregator,
) -> CollectStats {
    let mut stats = CollectStats::default();

    for (i, feed) in feeds.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match fetcher.fetch(feed).await {
            Ok(items) => {
                aggregator.ingest(feed, items);
                stats.fetched += 1;
            }
            Err(e) => {
                error!("Failed to fetch feed '{}': {}", feed.tag, e);
                stats.failed += 1;
            }
        }
    }

    info!(
        "Fetched {}/{} feeds, {} unique items",
        stats.fetched,
        feeds.len(),
        aggregator.len()
    );
    stats
}

/// Fetch, aggregate and rank; returns entries in report order
pub async fn build_entries(
    config: &Config,
    prior: PriorReport,
    today: NaiveDate,
) -> anyhow::Result<Vec<AggregatedEntry>> {
    let fetcher = Fetcher::new(config.request_timeout())?;
    let feeds = config.endpoints();
    info!("Polling {} feeds", feeds.len());

    let mut aggregator = Aggregator::new(prior, today);
    let stats = collect(&fetcher, &feeds, config.fetch_delay(), &mut aggregator).await;
    if stats.failed > 0 {
        warn!(
            "{} of {} feeds failed, report covers the remaining {}",
            stats.failed,
            feeds.len(),
            stats.fetched
        );
    }

    let mut entries = aggregator.into_entries();
    rank(&mut entries);
    Ok(entries)
}

/// Run the whole pipeline and return the markdown report
pub async fn run(config: &Config, prior: PriorReport, today: NaiveDate) -> anyhow::Result<String> {
    let entries = build_entries(config, prior, today).await?;
    let renderer = Renderer::new(&config.reader_url, config.max_title_length);
    Ok(renderer.render(&entries))
}
