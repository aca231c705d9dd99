//! Final dataset export with popularity labels.
//!
//! A pure pass over the collected records: each is labeled by subscriber
//! count and written once as CSV. Runs at the end of a collection; not
//! checkpointed and without retry logic.

use anyhow::{Context, Result};
use serde::Serialize;
use shared::{ChannelRecord, PopularityLabel};
use std::path::Path;
use tracing::info;

/// A channel record row with its derived popularity label.
///
/// Mirrors [`ChannelRecord`] field-for-field; the csv serializer cannot
/// flatten nested structs, so the row is spelled out flat.
#[derive(Debug, Serialize)]
struct LabeledRow<'a> {
    channel_id: &'a str,
    search_term: &'a str,
    channel_name: &'a str,
    subscribers: u64,
    total_views: u64,
    video_count: u64,
    comment_count: u64,
    account_age_years: f64,
    description: &'a str,
    published_at: &'a str,
    country: &'a str,
    custom_url: &'a str,
    channel_keywords: &'a str,
    profile_country: &'a str,
    uploads_playlist_id: &'a str,
    topic_categories: &'a str,
    banner_url: &'a str,
    default_language: &'a str,
    popularity_label: PopularityLabel,
}

impl<'a> From<&'a ChannelRecord> for LabeledRow<'a> {
    fn from(record: &'a ChannelRecord) -> Self {
        Self {
            channel_id: &record.channel_id,
            search_term: &record.search_term,
            channel_name: &record.channel_name,
            subscribers: record.subscribers,
            total_views: record.total_views,
            video_count: record.video_count,
            comment_count: record.comment_count,
            account_age_years: record.account_age_years,
            description: &record.description,
            published_at: &record.published_at,
            country: &record.country,
            custom_url: &record.custom_url,
            channel_keywords: &record.channel_keywords,
            profile_country: &record.profile_country,
            uploads_playlist_id: &record.uploads_playlist_id,
            topic_categories: &record.topic_categories,
            banner_url: &record.banner_url,
            default_language: &record.default_language,
            popularity_label: PopularityLabel::from_subscribers(record.subscribers),
        }
    }
}

/// Write the labeled dataset to `path`, returning the number of rows.
pub fn write_labeled(path: impl AsRef<Path>, records: &[ChannelRecord]) -> Result<usize> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory: {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    for record in records {
        writer
            .serialize(LabeledRow::from(record))
            .context("Failed to serialize export row")?;
    }

    writer.flush().context("Failed to flush export")?;

    info!(
        path = %path.display(),
        rows = records.len(),
        "Final dataset exported"
    );

    Ok(records.len())
}
