//! Durable checkpoint for resumable collection.
//!
//! The checkpoint is the full record set as CSV rows, rewritten wholesale
//! after every enrichment batch. On startup it is read once to reconstruct
//! the dedup set and per-term counts. The file is replaced atomically (temp
//! sibling + rename) so an interrupted write never leaves a torn checkpoint.

use crate::state::CollectionState;
use anyhow::{Context, Result};
use shared::ChannelRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Checkpoint store over a CSV file of channel records
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Create a store for the given checkpoint file path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint if one exists.
    ///
    /// Returns `None` when no checkpoint file is present. A present but
    /// unreadable checkpoint is an error; the system assumes
    /// well-formed-or-absent.
    pub fn load(&self) -> Result<Option<CollectionState>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No checkpoint found");
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open checkpoint: {}", self.path.display()))?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: ChannelRecord = row
                .with_context(|| format!("Malformed checkpoint row in {}", self.path.display()))?;
            records.push(record);
        }

        info!(
            path = %self.path.display(),
            records = records.len(),
            "Resuming from checkpoint"
        );

        Ok(Some(CollectionState::from_records(records)))
    }

    /// Persist the full state, replacing any previous checkpoint atomically.
    pub fn save(&self, state: &CollectionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create checkpoint directory: {}", parent.display())
            })?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&tmp_path).with_context(|| {
                format!("Failed to create checkpoint temp file: {}", tmp_path.display())
            })?;

            for record in state.records() {
                writer
                    .serialize(record)
                    .context("Failed to serialize checkpoint row")?;
            }

            writer.flush().context("Failed to flush checkpoint")?;
        }

        std::fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("Failed to replace checkpoint: {}", self.path.display())
        })?;

        debug!(
            path = %self.path.display(),
            records = state.len(),
            "Checkpoint saved"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(channel_id: &str, term: &str, subscribers: u64) -> ChannelRecord {
        ChannelRecord {
            channel_id: channel_id.to_string(),
            search_term: term.to_string(),
            channel_name: format!("channel {}", channel_id),
            subscribers,
            total_views: 9_999,
            video_count: 42,
            comment_count: 17,
            account_age_years: 1.25,
            description: "a, description with commas".to_string(),
            published_at: "2020-06-15T12:00:00Z".to_string(),
            country: "IN".to_string(),
            custom_url: "@handle".to_string(),
            channel_keywords: "vlog travel".to_string(),
            profile_country: "IN".to_string(),
            uploads_playlist_id: "UU123".to_string(),
            topic_categories: "Lifestyle, Travel".to_string(),
            banner_url: String::new(),
            default_language: "hi".to_string(),
        }
    }

    #[test]
    fn test_missing_checkpoint_is_none() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = CheckpointStore::new(temp_dir.path().join("partial.csv"));

        assert!(store.load()?.is_none());
        Ok(())
    }

    #[test]
    fn test_save_and_load_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = CheckpointStore::new(temp_dir.path().join("partial.csv"));

        let mut state = CollectionState::new();
        state.insert(record("UC1", "term a", 1_000));
        state.insert(record("UC2", "term a", 200_000));
        state.insert(record("UC3", "term b", 750_000));
        store.save(&state)?;

        let loaded = store.load()?.expect("checkpoint should exist");
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.term_count("term a"), 2);
        assert_eq!(loaded.term_count("term b"), 1);
        assert!(loaded.contains("UC2"));
        assert_eq!(loaded.records(), state.records());

        Ok(())
    }

    #[test]
    fn test_save_overwrites_wholesale() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = CheckpointStore::new(temp_dir.path().join("partial.csv"));

        let mut state = CollectionState::new();
        state.insert(record("UC1", "term a", 500));
        store.save(&state)?;

        state.insert(record("UC2", "term b", 600));
        store.save(&state)?;

        let loaded = store.load()?.unwrap();
        assert_eq!(loaded.len(), 2);
        // No stray temp file left behind
        assert!(!temp_dir.path().join("partial.csv.tmp").exists());

        Ok(())
    }
}
