//! Configuration management for the collector.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Channel collector settings
    pub collector: CollectorConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Channel collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// YouTube Data API v3 base URL
    pub base_url: String,

    /// API key pool, rotated on quota/transport failures
    pub api_keys: Vec<String>,

    /// Search keywords to collect channels for
    pub search_terms: Vec<String>,

    /// Region code applied to channel searches
    pub region_code: String,

    /// Maximum channels attributed to a single search term
    pub max_channels_per_term: usize,

    /// Maximum search result pages fetched per term
    pub max_pages_per_term: u32,

    /// Number of recent uploads summed into the engagement metric
    pub recent_videos: u32,

    /// Delay between successive search page fetches in milliseconds
    pub page_delay_ms: u64,

    /// Delay between search terms in milliseconds
    pub term_delay_ms: u64,

    /// Delay after each enrichment batch in milliseconds
    pub batch_delay_ms: u64,

    /// Cool-down applied when the key pool wraps around, in seconds
    pub key_cooldown_secs: u64,

    /// Maximum credential rotations before a failing call is surfaced
    pub max_rotations: u32,

    /// Checkpoint file name (relative to data directory or absolute)
    pub checkpoint_file: String,

    /// Final export file name (relative to data directory or absolute)
    pub export_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            collector: CollectorConfig::default(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            api_keys: Vec::new(),
            search_terms: vec![
                "Indian vlogger".to_string(),
                "Indian tech YouTuber".to_string(),
                "Indian beauty channel".to_string(),
                "Indian food YouTuber".to_string(),
                "Indian travel vlogger".to_string(),
                "Indian fitness channel".to_string(),
                "Indian gamer".to_string(),
                "Indian education channel".to_string(),
                "Indian music channel".to_string(),
                "Indian comedy YouTuber".to_string(),
                "Indian finance channel".to_string(),
                "Indian review channel".to_string(),
            ],
            region_code: "IN".to_string(),
            max_channels_per_term: 500,
            max_pages_per_term: 10,
            recent_videos: 10,
            page_delay_ms: 1000,
            term_delay_ms: 2000,
            batch_delay_ms: 2000,
            key_cooldown_secs: 3600,
            max_rotations: 10,
            checkpoint_file: "channels_partial.csv".to_string(),
            export_file: "channels_labeled.csv".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }

    /// Get the absolute path for the checkpoint file
    pub fn checkpoint_path(&self) -> PathBuf {
        let path = Path::new(&self.collector.checkpoint_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }

    /// Get the absolute path for the final export file
    pub fn export_path(&self) -> PathBuf {
        let path = Path::new(&self.collector.export_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
