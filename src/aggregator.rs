use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::FeedEndpoint;
use crate::fetcher::RawItem;
use crate::prior_report::PriorReport;

/// A feed an entry was seen in, rendered as `[tag](url)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRef {
    pub tag: String,
    pub url: String,
}

impl From<&FeedEndpoint> for FeedRef {
    fn from(feed: &FeedEndpoint) -> Self {
        Self {
            tag: feed.tag.clone(),
            url: feed.url.clone(),
        }
    }
}

/// One report row: every sighting of a GUID merged together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedEntry {
    pub guid: String,
    pub title: String,
    pub pub_date: String,
    pub feeds: Vec<FeedRef>,
    pub is_new: bool,
    pub is_today: bool,
}

/// Folds raw items from successive feeds into one entry per GUID.
///
/// The first sighting of a GUID fixes its title, date and novelty flags;
/// later sightings only add the feed they came from.
pub struct Aggregator {
    prior: PriorReport,
    today: NaiveDate,
    index: HashMap<String, usize>,
    entries: Vec<AggregatedEntry>,
}

impl Aggregator {
    pub fn new(prior: PriorReport, today: NaiveDate) -> Self {
        Self {
            prior,
            today,
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn ingest(&mut self, feed: &FeedEndpoint, items: Vec<RawItem>) {
        for item in items {
            self.observe(feed, item);
        }
    }

    pub fn observe(&mut self, feed: &FeedEndpoint, item: RawItem) {
        if let Some(&pos) = self.index.get(&item.guid) {
            let entry = &mut self.entries[pos];
            if entry.feeds.iter().any(|f| f.url == feed.url) {
                debug!("Feed '{}' repeated item {}", feed.tag, item.guid);
            } else {
                entry.feeds.push(FeedRef::from(feed));
            }
            return;
        }

        let entry = AggregatedEntry {
            is_new: !self.prior.contains(&item.guid),
            is_today: published_on(&item.pub_date, self.today),
            feeds: vec![FeedRef::from(feed)],
            guid: item.guid,
            title: item.title,
            pub_date: item.pub_date,
        };

        self.index.insert(entry.guid.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order their GUIDs were first seen
    pub fn into_entries(self) -> Vec<AggregatedEntry> {
        self.entries
    }
}

/// Whether an RFC 1123 timestamp falls on `today`.
///
/// The date is taken as written, in the timestamp's own offset. Unparseable
/// timestamps are logged and count as not today.
pub fn published_on(pub_date: &str, today: NaiveDate) -> bool {
    match parse_pub_date(pub_date.trim()) {
        Ok(published) => published == today,
        Err(e) => {
            warn!("Error parsing date {:?}: {}", pub_date, e);
            false
        }
    }
}

/// Calendar date of an RFC 1123 timestamp, as written.
///
/// Zone abbreviations chrono does not recognize (`UTC`, `CET`, ...) are
/// accepted and the wall-clock date is used unchanged.
fn parse_pub_date(pub_date: &str) -> Result<NaiveDate, chrono::ParseError> {
    let err = match DateTime::parse_from_rfc2822(pub_date) {
        Ok(published) => return Ok(published.date_naive()),
        Err(e) => e,
    };

    match pub_date.rsplit_once(' ') {
        Some((rest, zone)) if !zone.is_empty() && zone.chars().all(|c| c.is_ascii_alphabetic()) => {
            NaiveDateTime::parse_from_str(rest.trim_end(), "%a, %d %b %Y %H:%M:%S")
                .map(|published| published.date())
        }
        _ => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 9).unwrap()
    }

    fn feed(tag: &str) -> FeedEndpoint {
        FeedEndpoint::new(&format!("https://medium.com/feed/tag/{}", tag))
    }

    fn item(guid: &str, title: &str) -> RawItem {
        RawItem::new(title, guid, "Mon, 09 Dec 2024 12:00:00 GMT")
    }

    mod published_on_tests {
        use super::*;

        #[test]
        fn test_same_day_gmt() {
            assert!(published_on("Mon, 09 Dec 2024 00:00:01 GMT", today()));
            assert!(published_on("Mon, 09 Dec 2024 23:59:59 GMT", today()));
        }

        #[test]
        fn test_other_day() {
            assert!(!published_on("Sun, 08 Dec 2024 23:59:59 GMT", today()));
            assert!(!published_on("Tue, 10 Dec 2024 00:00:00 GMT", today()));
        }

        #[test]
        fn test_date_read_in_own_offset() {
            // 2024-12-08 in UTC, but written as the 9th
            assert!(published_on("Mon, 09 Dec 2024 01:00:00 +0200", today()));
        }

        #[test]
        fn test_unparseable_is_not_today() {
            assert!(!published_on("yesterday-ish", today()));
            assert!(!published_on("", today()));
            assert!(!published_on("2024-12-09T12:00:00Z", today()));
            assert!(!published_on("Mon, 09 Dec 2024 12:00:00 +02AB", today()));
            assert!(!published_on("Mon, 09 Dec 2024 UTC", today()));
        }

        #[test]
        fn test_utc_abbreviation() {
            assert!(published_on("Mon, 09 Dec 2024 12:00:00 UTC", today()));
            assert!(!published_on("Sun, 08 Dec 2024 23:59:59 UTC", today()));
        }

        #[test]
        fn test_other_zone_abbreviation_read_as_written() {
            // 2024-12-08 23:30 in UTC, but written as the 9th
            assert!(published_on("Mon, 09 Dec 2024 00:30:00 CET", today()));
            assert!(!published_on("Tue, 10 Dec 2024 00:30:00 CET", today()));
        }
    }

    #[test]
    fn test_first_sighting_creates_entry() {
        let mut aggregator = Aggregator::new(PriorReport::default(), today());
        aggregator.observe(&feed("security"), item("G1", "Title"));

        let entries = aggregator.into_entries();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.guid, "G1");
        assert_eq!(entry.title, "Title");
        assert_eq!(entry.pub_date, "Mon, 09 Dec 2024 12:00:00 GMT");
        assert_eq!(
            entry.feeds,
            vec![FeedRef {
                tag: "security".to_string(),
                url: "https://medium.com/feed/tag/security".to_string(),
            }]
        );
        assert!(entry.is_new);
        assert!(entry.is_today);
    }

    #[test]
    fn test_same_guid_across_feeds_merges() {
        let feeds = [feed("security"), feed("hacking"), feed("infosec")];
        let mut aggregator = Aggregator::new(PriorReport::default(), today());

        for (i, f) in feeds.iter().enumerate() {
            let mut raw = item("G1", &format!("Title from feed {}", i));
            raw.pub_date = format!("Mon, 0{} Dec 2024 12:00:00 GMT", i + 1);
            aggregator.ingest(f, vec![raw]);
        }

        let entries = aggregator.into_entries();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Title from feed 0");
        assert_eq!(entry.pub_date, "Mon, 01 Dec 2024 12:00:00 GMT");
        let tags: Vec<&str> = entry.feeds.iter().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, vec!["security", "hacking", "infosec"]);
    }

    #[test]
    fn test_same_feed_repeat_not_duplicated() {
        let security = feed("security");
        let mut aggregator = Aggregator::new(PriorReport::default(), today());

        aggregator.ingest(&security, vec![item("G1", "A"), item("G1", "B")]);
        aggregator.ingest(&feed("hacking"), vec![item("G1", "C")]);
        aggregator.ingest(&security, vec![item("G1", "D")]);

        let entries = aggregator.into_entries();
        assert_eq!(entries[0].feeds.len(), 2);
        assert_eq!(entries[0].title, "A");
    }

    #[test]
    fn test_novelty_uses_prior_report() {
        let prior = PriorReport::new("| ... | [Old](https://freedium.cfd/G1) | ... |");
        let mut aggregator = Aggregator::new(prior, today());

        aggregator.ingest(&feed("security"), vec![item("G1", "Old"), item("G2", "Fresh")]);

        let entries = aggregator.into_entries();
        assert!(!entries[0].is_new);
        assert!(entries[1].is_new);
    }

    #[test]
    fn test_novelty_fixed_at_creation() {
        // A later sighting never revisits the flags of an existing entry
        let mut aggregator = Aggregator::new(PriorReport::default(), today());

        let mut first = item("G1", "A");
        first.pub_date = "not a date".to_string();
        aggregator.observe(&feed("security"), first);
        aggregator.observe(&feed("hacking"), item("G1", "B"));

        let entries = aggregator.into_entries();
        assert!(!entries[0].is_today);
        assert_eq!(entries[0].pub_date, "not a date");
    }

    #[test]
    fn test_bad_date_keeps_item() {
        let mut aggregator = Aggregator::new(PriorReport::default(), today());
        aggregator.observe(&feed("security"), RawItem::new("No date", "G1", ""));

        assert_eq!(aggregator.len(), 1);
        assert!(!aggregator.into_entries()[0].is_today);
    }

    #[test]
    fn test_entries_in_first_seen_order() {
        let mut aggregator = Aggregator::new(PriorReport::default(), today());
        aggregator.ingest(&feed("security"), vec![item("G3", "c"), item("G1", "a")]);
        aggregator.ingest(&feed("hacking"), vec![item("G1", "a"), item("G2", "b")]);

        let guids: Vec<String> = aggregator
            .into_entries()
            .into_iter()
            .map(|e| e.guid)
            .collect();
        assert_eq!(guids, vec!["G3", "G1", "G2"]);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let run = || {
            let mut aggregator = Aggregator::new(PriorReport::default(), today());
            aggregator.ingest(&feed("security"), vec![item("G1", "a"), item("G2", "b")]);
            aggregator.ingest(&feed("hacking"), vec![item("G2", "b"), item("G3", "c")]);
            aggregator.into_entries()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_aggregator() {
        let aggregator = Aggregator::new(PriorReport::default(), today());
        assert!(aggregator.is_empty());
        assert!(aggregator.into_entries().is_empty());
    }
}
