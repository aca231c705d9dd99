//! API key pool with rotation and cool-down.
//!
//! Keys are interchangeable; exactly one is active at a time. Rotation is
//! purely reactive to failure signals from callers, with no per-key quota
//! tracking. Wrapping past the last key waits out a cool-down first,
//! modeling the upstream quota-reset window.

use anyhow::{bail, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Ordered pool of API keys with a single active credential
#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<String>,
    current: usize,
    cooldown: Duration,
    wraps: u64,
}

impl KeyPool {
    /// Create a pool from an ordered key list
    pub fn new(keys: Vec<String>, cooldown: Duration) -> Result<Self> {
        if keys.is_empty() {
            bail!("API key pool is empty; at least one key is required");
        }

        Ok(Self {
            keys,
            current: 0,
            cooldown,
            wraps: 0,
        })
    }

    /// Get the active key
    pub fn current(&self) -> &str {
        &self.keys[self.current]
    }

    /// Advance to the next key.
    ///
    /// When the pool is exhausted this blocks for the cool-down duration and
    /// wraps back to the first key; all fetching pauses for that window.
    pub async fn rotate(&mut self) {
        self.current += 1;

        if self.current >= self.keys.len() {
            warn!(
                cooldown_secs = self.cooldown.as_secs(),
                "All API keys exhausted, waiting out cool-down before retrying"
            );
            sleep(self.cooldown).await;
            self.current = 0;
            self.wraps += 1;
        }

        info!(key_index = self.current + 1, "Switched to next API key");
    }

    /// Number of keys in the pool
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pool is empty (never true after construction)
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// How many times the pool has wrapped through a cool-down
    pub fn wrap_count(&self) -> u64 {
        self.wraps
    }
}
