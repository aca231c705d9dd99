//! Data models for the project.
//!
//! This module defines the enriched channel record produced by the collector
//! and the popularity classification derived from it.

use serde::{Deserialize, Serialize};

/// Enriched channel metadata collected from the YouTube Data API.
///
/// All fields are flat scalars so a record maps 1:1 onto a checkpoint or
/// export row. List-valued upstream fields (topic categories) are stored as
/// a joined string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Unique channel ID
    pub channel_id: String,
    /// Search term that first surfaced this channel
    pub search_term: String,

    pub channel_name: String,
    pub subscribers: u64,
    pub total_views: u64,
    pub video_count: u64,

    /// Summed comment count over the channel's most recent uploads
    pub comment_count: u64,
    /// Channel age in years, two decimals, 0.0 when the creation
    /// timestamp was missing or unparsable
    pub account_age_years: f64,

    pub description: String,
    pub published_at: String,
    pub country: String,
    pub custom_url: String,
    pub channel_keywords: String,
    pub profile_country: String,
    pub uploads_playlist_id: String,
    pub topic_categories: String,
    pub banner_url: String,
    pub default_language: String,
}

/// Popularity bucket derived from subscriber count.
///
/// Intervals are half-open: [0, 100k) is Low, [100k, 500k) is Medium,
/// [500k, inf) is High.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PopularityLabel {
    Low,
    Medium,
    High,
}

impl PopularityLabel {
    /// Classify a subscriber count into its popularity bucket
    pub fn from_subscribers(subscribers: u64) -> Self {
        if subscribers >= 500_000 {
            PopularityLabel::High
        } else if subscribers >= 100_000 {
            PopularityLabel::Medium
        } else {
            PopularityLabel::Low
        }
    }
}

impl std::fmt::Display for PopularityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PopularityLabel::Low => write!(f, "Low"),
            PopularityLabel::Medium => write!(f, "Medium"),
            PopularityLabel::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for PopularityLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(PopularityLabel::Low),
            "Medium" => Ok(PopularityLabel::Medium),
            "High" => Ok(PopularityLabel::High),
            _ => Err(anyhow::anyhow!("Invalid popularity label: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        // Half-open intervals: the lower bound belongs to the bucket above
        assert_eq!(PopularityLabel::from_subscribers(0), PopularityLabel::Low);
        assert_eq!(
            PopularityLabel::from_subscribers(99_999),
            PopularityLabel::Low
        );
        assert_eq!(
            PopularityLabel::from_subscribers(100_000),
            PopularityLabel::Medium
        );
        assert_eq!(
            PopularityLabel::from_subscribers(499_999),
            PopularityLabel::Medium
        );
        assert_eq!(
            PopularityLabel::from_subscribers(500_000),
            PopularityLabel::High
        );
        assert_eq!(
            PopularityLabel::from_subscribers(10_000_000),
            PopularityLabel::High
        );
    }

    #[test]
    fn test_label_round_trip() {
        for label in [
            PopularityLabel::Low,
            PopularityLabel::Medium,
            PopularityLabel::High,
        ] {
            let parsed: PopularityLabel = label.to_string().parse().unwrap();
            assert_eq!(parsed, label);
        }
        assert!("Colossal".parse::<PopularityLabel>().is_err());
    }
}
