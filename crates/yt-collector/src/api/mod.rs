//! YouTube Data API v3 client implementation.
//!
//! This module provides a credential-rotating client for the search,
//! channels, playlistItems and videos endpoints, behind the [`ChannelApi`]
//! trait so the pipeline can run against test doubles.

pub mod client;
pub mod error;
pub mod keys;
pub mod types;

pub use client::{ChannelApi, YouTubeClient};
pub use error::{ApiError, ApiResult};
pub use keys::KeyPool;
pub use types::*;
