//! In-memory collection state.
//!
//! Bundles the three pieces of global mutable state the pipeline threads
//! through its steps: the accumulated records, the global dedup ID set, and
//! the per-term counts. All three move together through [`CollectionState::insert`],
//! so no record exists without its ID being deduplicated and counted.

use shared::ChannelRecord;
use std::collections::{HashMap, HashSet};

/// Accumulated collection results plus dedup and counting state
#[derive(Debug, Default)]
pub struct CollectionState {
    records: Vec<ChannelRecord>,
    collected_ids: HashSet<String>,
    term_counts: HashMap<String, usize>,
}

impl CollectionState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from checkpoint rows.
    ///
    /// The dedup set and per-term counts are derived by grouping the rows,
    /// so a checkpoint alone is enough to resume exactly.
    pub fn from_records(records: Vec<ChannelRecord>) -> Self {
        let mut collected_ids = HashSet::with_capacity(records.len());
        let mut term_counts: HashMap<String, usize> = HashMap::new();

        for record in &records {
            collected_ids.insert(record.channel_id.clone());
            *term_counts.entry(record.search_term.clone()).or_default() += 1;
        }

        Self {
            records,
            collected_ids,
            term_counts,
        }
    }

    /// Insert a record, updating the dedup set and term count with it.
    ///
    /// Returns false and changes nothing when the channel is already
    /// collected; at most one record per channel ID ever exists.
    pub fn insert(&mut self, record: ChannelRecord) -> bool {
        if !self.collected_ids.insert(record.channel_id.clone()) {
            return false;
        }

        *self
            .term_counts
            .entry(record.search_term.clone())
            .or_default() += 1;
        self.records.push(record);
        true
    }

    /// Whether a channel ID has already been collected
    pub fn contains(&self, channel_id: &str) -> bool {
        self.collected_ids.contains(channel_id)
    }

    /// Number of records attributed to a search term
    pub fn term_count(&self, term: &str) -> usize {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// All collected records, in insertion order
    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    /// Total number of collected records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been collected yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(channel_id: &str, term: &str) -> ChannelRecord {
        ChannelRecord {
            channel_id: channel_id.to_string(),
            search_term: term.to_string(),
            channel_name: format!("channel {}", channel_id),
            subscribers: 1000,
            total_views: 50_000,
            video_count: 12,
            comment_count: 34,
            account_age_years: 2.5,
            description: String::new(),
            published_at: "2021-01-01T00:00:00Z".to_string(),
            country: "IN".to_string(),
            custom_url: String::new(),
            channel_keywords: String::new(),
            profile_country: String::new(),
            uploads_playlist_id: String::new(),
            topic_categories: String::new(),
            banner_url: String::new(),
            default_language: String::new(),
        }
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut state = CollectionState::new();

        assert!(state.insert(record("UC1", "term a")));
        assert!(!state.insert(record("UC1", "term a")));
        // Same ID under a different term is still a duplicate
        assert!(!state.insert(record("UC1", "term b")));

        assert_eq!(state.len(), 1);
        assert_eq!(state.term_count("term a"), 1);
        assert_eq!(state.term_count("term b"), 0);
    }

    #[test]
    fn test_rejected_insert_leaves_counts_untouched() {
        let mut state = CollectionState::new();
        state.insert(record("UC1", "term a"));
        state.insert(record("UC1", "term b"));

        assert_eq!(state.term_count("term b"), 0);
        assert_eq!(state.records().len(), 1);
        assert_eq!(state.records()[0].search_term, "term a");
    }

    #[test]
    fn test_from_records_groups_counts() {
        let rows = vec![
            record("UC1", "term a"),
            record("UC2", "term a"),
            record("UC3", "term b"),
        ];
        let state = CollectionState::from_records(rows);

        assert_eq!(state.len(), 3);
        assert_eq!(state.term_count("term a"), 2);
        assert_eq!(state.term_count("term b"), 1);
        assert!(state.contains("UC2"));
        assert!(!state.contains("UC4"));
    }
}
