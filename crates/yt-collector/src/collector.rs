//! Main collection orchestrator.
//!
//! Drives the pipeline in sequence: load checkpoint, discover channel IDs
//! per search term, enrich all discoveries in batches, then classify and
//! export the final dataset. Strictly sequential; the only suspension
//! points are pacing delays and the credential cool-down.

use crate::api::ChannelApi;
use crate::checkpoint::CheckpointStore;
use crate::enrich::DetailEnricher;
use crate::export;
use crate::search::{Discovery, SearchPaginator};
use crate::state::CollectionState;
use anyhow::{Context, Result};
use shared::config::CollectorConfig;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Statistics for a collection run
#[derive(Debug, Clone, Default)]
pub struct CollectorStats {
    pub terms_processed: usize,
    pub terms_skipped: usize,
    pub ids_discovered: usize,
    pub new_records: usize,
    pub total_records: usize,
    pub exported_rows: usize,
    pub errors: usize,
}

/// Sequential channel collection pipeline
pub struct ChannelCollector<A: ChannelApi> {
    api: A,
    checkpoint: CheckpointStore,
    config: CollectorConfig,
    export_path: PathBuf,
}

impl<A: ChannelApi> ChannelCollector<A> {
    pub fn new(
        api: A,
        checkpoint: CheckpointStore,
        config: CollectorConfig,
        export_path: PathBuf,
    ) -> Self {
        Self {
            api,
            checkpoint,
            config,
            export_path,
        }
    }

    /// Run the complete collection process
    ///
    /// 1. Load checkpoint (or start empty)
    /// 2. Discover channel IDs for each search term
    /// 3. Enrich all discoveries in batches, checkpointing per batch
    /// 4. Classify and export the final dataset
    pub async fn run(&mut self) -> Result<CollectorStats> {
        info!("Starting channel collection");

        let mut stats = CollectorStats::default();

        let mut state = match self.checkpoint.load()? {
            Some(state) => {
                info!(collected = state.len(), "Resumed from checkpoint");
                state
            }
            None => {
                info!("No checkpoint found, starting fresh");
                CollectionState::new()
            }
        };

        // Phase 1: discover channel IDs per term
        info!(
            terms = self.config.search_terms.len(),
            "Phase 1: Discovering channels per search term"
        );

        let terms = self.config.search_terms.clone();
        let mut discoveries: Vec<Discovery> = Vec::new();
        let mut pending: HashSet<String> = HashSet::new();

        for (idx, term) in terms.iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, terms.len()),
                term = %term,
                "Processing search term"
            );

            let at_cap = state.term_count(term) >= self.config.max_channels_per_term;

            let mut paginator = SearchPaginator::new(
                &mut self.api,
                self.config.max_pages_per_term,
                self.config.max_channels_per_term,
                Duration::from_millis(self.config.page_delay_ms),
                self.config.max_rotations,
            );

            match paginator.collect_term(&state, &pending, term).await {
                Ok(found) => {
                    if at_cap {
                        stats.terms_skipped += 1;
                    } else {
                        stats.terms_processed += 1;
                    }
                    stats.ids_discovered += found.len();
                    for discovery in found {
                        pending.insert(discovery.channel_id.clone());
                        discoveries.push(discovery);
                    }
                }
                Err(e) => {
                    error!(term = %term, error = %e, "Failed to collect channels for term");
                    stats.errors += 1;
                }
            }

            sleep(Duration::from_millis(self.config.term_delay_ms)).await;
        }

        info!(
            discovered = stats.ids_discovered,
            "Phase 2: Enriching discovered channels"
        );

        // Phase 2: enrich in batches (checkpointing per batch)
        let mut enricher = DetailEnricher::new(
            &mut self.api,
            &self.checkpoint,
            self.config.recent_videos,
            Duration::from_millis(self.config.batch_delay_ms),
            self.config.max_rotations,
        );
        stats.new_records = enricher
            .enrich_all(&mut state, &discoveries)
            .await
            .context("Enrichment failed")?;
        stats.total_records = state.len();

        // Phase 3: classify and export
        info!("Phase 3: Classifying and exporting dataset");
        stats.exported_rows = export::write_labeled(&self.export_path, state.records())
            .context("Failed to export final dataset")?;

        info!(
            terms_processed = stats.terms_processed,
            terms_skipped = stats.terms_skipped,
            ids_discovered = stats.ids_discovered,
            new_records = stats.new_records,
            total_records = stats.total_records,
            exported_rows = stats.exported_rows,
            errors = stats.errors,
            "Channel collection complete"
        );

        Ok(stats)
    }
}
