//! Channel collector library for the YouTube Data API v3.
//!
//! This library discovers channels for a set of search keywords, enriches
//! them with statistics and recent-engagement data, and persists the result
//! as a resumable CSV dataset.

pub mod api;
pub mod checkpoint;
pub mod collector;
pub mod enrich;
pub mod export;
pub mod search;
pub mod state;

pub use api::{ApiError, ApiResult, ChannelApi, KeyPool, YouTubeClient};
pub use checkpoint::CheckpointStore;
pub use collector::{ChannelCollector, CollectorStats};
pub use enrich::DetailEnricher;
pub use search::{Discovery, SearchPaginator};
pub use state::CollectionState;
