//! Shared library for the YouTube influencer collection project.
//!
//! This crate provides common functionality used by the collector binary:
//! - Configuration management
//! - Data models for channel records
//! - File path utilities
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use paths::DataPaths;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
