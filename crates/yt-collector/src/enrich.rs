//! Detail enrichment for discovered channels.
//!
//! Processes accumulated (ID, term) pairs in 50-ID batches: one bulk
//! metadata fetch per batch, a nested playlist/videos lookup for the
//! engagement metric, then an atomic state insert. The full state is
//! checkpointed after every batch so an interrupted run resumes exactly.

use crate::api::{parse_count, ApiResult, ChannelApi, ChannelItem};
use crate::checkpoint::CheckpointStore;
use crate::search::Discovery;
use crate::state::CollectionState;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shared::ChannelRecord;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Batch size for bulk detail fetches (the channels endpoint maximum)
pub const DETAIL_BATCH_SIZE: usize = 50;

/// Chunk size for bulk video statistics fetches
const VIDEO_STATS_CHUNK: usize = 50;

/// Enriches discovered channels and checkpoints progress per batch
pub struct DetailEnricher<'a, A: ChannelApi> {
    api: &'a mut A,
    checkpoint: &'a CheckpointStore,
    /// Recent uploads summed into the engagement metric
    recent_videos: u32,
    /// Pacing delay after each successful batch
    batch_delay: Duration,
    /// Rotation budget before a failing bulk fetch is surfaced
    max_rotations: u32,
}

impl<'a, A: ChannelApi> DetailEnricher<'a, A> {
    pub fn new(
        api: &'a mut A,
        checkpoint: &'a CheckpointStore,
        recent_videos: u32,
        batch_delay: Duration,
        max_rotations: u32,
    ) -> Self {
        Self {
            api,
            checkpoint,
            recent_videos,
            batch_delay,
            max_rotations,
        }
    }

    /// Enrich all discoveries in batches, merging into `state`.
    ///
    /// Returns the number of new records added. Retrying a batch after a
    /// credential rotation is idempotent: channels already in the dedup set
    /// are skipped.
    pub async fn enrich_all(
        &mut self,
        state: &mut CollectionState,
        discoveries: &[Discovery],
    ) -> Result<usize> {
        let mut new_records = 0;

        for (batch_index, batch) in discoveries.chunks(DETAIL_BATCH_SIZE).enumerate() {
            let ids: Vec<String> = batch.iter().map(|d| d.channel_id.clone()).collect();
            let term_by_id: HashMap<&str, &str> = batch
                .iter()
                .map(|d| (d.channel_id.as_str(), d.term.as_str()))
                .collect();

            let items = self.fetch_batch(&ids).await?;

            for item in items {
                if state.contains(&item.id) {
                    continue;
                }
                // Attribution is by ID, not batch position; the API may
                // reorder or omit entities
                let Some(term) = term_by_id.get(item.id.as_str()).copied() else {
                    continue;
                };

                let record = self.build_record(item, term).await;
                if state.insert(record) {
                    new_records += 1;
                }
            }

            self.checkpoint
                .save(state)
                .context("Failed to checkpoint after batch")?;

            info!(
                batch = batch_index + 1,
                total_collected = state.len(),
                "Batch enriched and checkpointed"
            );

            sleep(self.batch_delay).await;
        }

        Ok(new_records)
    }

    /// Bulk metadata fetch with rotate-and-retry on quota/transport failures
    async fn fetch_batch(&mut self, ids: &[String]) -> Result<Vec<ChannelItem>> {
        let mut rotations = 0;

        loop {
            match self.api.channel_details(ids).await {
                Ok(items) => return Ok(items),
                Err(e) if e.should_rotate() && rotations < self.max_rotations => {
                    warn!(error = %e, "Detail fetch failed, rotating credential");
                    self.api.rotate_credential().await;
                    rotations += 1;
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e).context(format!(
                        "detail fetch still failing after {} credential rotations",
                        rotations
                    )))
                }
            }
        }
    }

    /// Assemble the enriched record for one channel
    async fn build_record(&mut self, item: ChannelItem, term: &str) -> ChannelRecord {
        let uploads_playlist_id = item
            .content_details
            .related_playlists
            .uploads
            .unwrap_or_default();

        let comment_count = if uploads_playlist_id.is_empty() {
            0
        } else {
            self.engagement_for(&uploads_playlist_id).await
        };

        let snippet = item.snippet;
        let branding = item.branding_settings;
        let topic_categories = item.topic_details.topic_categories.join(", ");

        ChannelRecord {
            channel_id: item.id,
            search_term: term.to_string(),
            channel_name: snippet.title,
            subscribers: parse_count(&item.statistics.subscriber_count),
            total_views: parse_count(&item.statistics.view_count),
            video_count: parse_count(&item.statistics.video_count),
            comment_count,
            account_age_years: account_age_years(&snippet.published_at, Utc::now()),
            description: snippet.description,
            published_at: snippet.published_at,
            country: snippet.country.unwrap_or_else(|| "IN".to_string()),
            custom_url: branding.channel.custom_url.unwrap_or_default(),
            channel_keywords: branding.channel.keywords.unwrap_or_default(),
            profile_country: branding.channel.country.unwrap_or_default(),
            uploads_playlist_id,
            topic_categories,
            banner_url: branding.image.banner_external_url.unwrap_or_default(),
            default_language: snippet.default_language.unwrap_or_default(),
        }
    }

    /// Engagement metric: summed comments over the most recent uploads.
    ///
    /// Any failure in this secondary fetch degrades the metric to 0 for
    /// this channel; the enclosing batch continues.
    async fn engagement_for(&mut self, playlist_id: &str) -> u64 {
        match self.fetch_engagement(playlist_id).await {
            Ok(total) => total,
            Err(e) => {
                warn!(
                    playlist_id = playlist_id,
                    error = %e,
                    "Engagement lookup failed, defaulting to 0"
                );
                0
            }
        }
    }

    async fn fetch_engagement(&mut self, playlist_id: &str) -> ApiResult<u64> {
        let video_ids = self
            .api
            .recent_video_ids(playlist_id, self.recent_videos)
            .await?;

        if video_ids.is_empty() {
            return Ok(0);
        }

        let mut total = 0;
        for chunk in video_ids.chunks(VIDEO_STATS_CHUNK) {
            total += self.api.comment_counts(chunk).await?;
        }

        Ok(total)
    }
}

/// Channel age in years, rounded to two decimals.
///
/// Missing or unparsable timestamps yield 0.0; this never fails.
pub fn account_age_years(published_at: &str, now: DateTime<Utc>) -> f64 {
    let Ok(created) = DateTime::parse_from_rfc3339(published_at) else {
        return 0.0;
    };

    let days = (now - created.with_timezone(&Utc)).num_days() as f64;
    (days / 365.0 * 100.0).round() / 100.0
}
