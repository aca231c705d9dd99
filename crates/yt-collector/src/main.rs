//! Channel collector CLI application.

use anyhow::{bail, Context, Result};
use clap::Parser;
use shared::{Config, DataPaths};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use yt_collector::{ChannelCollector, CheckpointStore, KeyPool, YouTubeClient};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "yt-collector".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!("Channel collector starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    if config.collector.api_keys.is_empty() {
        bail!(
            "No API keys configured; add at least one key to [collector] api_keys in {}",
            args.config.display()
        );
    }

    // Initialize data paths
    let data_paths = DataPaths::new(config.data_dir());
    data_paths
        .create_dirs()
        .context("Failed to create data directories")?;

    // Initialize API client with the credential pool
    let keys = KeyPool::new(
        config.collector.api_keys.clone(),
        Duration::from_secs(config.collector.key_cooldown_secs),
    )
    .context("Failed to create key pool")?;

    info!(keys = keys.len(), "Credential pool initialized");

    let client = YouTubeClient::new(
        config.collector.base_url.clone(),
        keys,
        config.collector.region_code.clone(),
    )
    .context("Failed to create YouTube client")?;

    // Initialize checkpoint store
    let checkpoint = CheckpointStore::new(config.checkpoint_path());
    info!(checkpoint = %checkpoint.path().display(), "Checkpoint store ready");

    // Run the collector
    let mut collector = ChannelCollector::new(
        client,
        checkpoint,
        config.collector.clone(),
        config.export_path(),
    );

    let stats = collector.run().await.context("Collection failed")?;

    // Display final statistics
    info!("=== Collection Complete ===");
    info!("Terms processed: {}", stats.terms_processed);
    info!("Terms skipped (at cap): {}", stats.terms_skipped);
    info!("Channel IDs discovered: {}", stats.ids_discovered);
    info!("New records: {}", stats.new_records);
    info!("Total records: {}", stats.total_records);
    info!("Exported rows: {}", stats.exported_rows);
    info!("Errors: {}", stats.errors);

    info!("Channel collector finished successfully");

    Ok(())
}
