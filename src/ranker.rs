use crate::aggregator::AggregatedEntry;

/// Sort new entries first, then today's entries.
///
/// The sort is stable, so entries that tie on both flags keep the order
/// they came in (first-seen order when fed straight from the aggregator).
pub fn rank(entries: &mut [AggregatedEntry]) {
    entries.sort_by_key(|entry| (!entry.is_new, !entry.is_today));
}
