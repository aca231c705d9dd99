//! YouTube Data API v3 client with credential rotation.

use super::error::{ApiError, ApiResult};
use super::keys::KeyPool;
use super::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed search page size (the search endpoint maximum)
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// Remote operations the pipeline needs from the video platform.
///
/// Implemented by [`YouTubeClient`] and by in-memory doubles in tests. Every
/// call authenticates with the currently active credential; a failed call
/// reports whether rotating to the next credential is worthwhile via
/// [`ApiError::should_rotate`].
#[async_trait]
pub trait ChannelApi: Send {
    /// Fetch one page of channel-search results for a term
    async fn search_page(
        &mut self,
        term: &str,
        page_token: Option<&str>,
    ) -> ApiResult<SearchPage>;

    /// Bulk-fetch channel metadata for up to 50 IDs
    async fn channel_details(&mut self, ids: &[String]) -> ApiResult<Vec<ChannelItem>>;

    /// List the most recent video IDs from an uploads playlist
    async fn recent_video_ids(
        &mut self,
        playlist_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<String>>;

    /// Sum comment counts for one chunk of up to 50 video IDs
    async fn comment_counts(&mut self, video_ids: &[String]) -> ApiResult<u64>;

    /// Advance to the next credential (cool-down on pool wrap-around)
    async fn rotate_credential(&mut self);
}

/// YouTube Data API v3 client
pub struct YouTubeClient {
    /// HTTP client
    client: Client,
    /// API base URL
    base_url: String,
    /// Credential pool
    keys: KeyPool,
    /// Region code applied to searches
    region_code: String,
}

impl YouTubeClient {
    /// Create a new client
    pub fn new(base_url: String, keys: KeyPool, region_code: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("yt-collector/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            keys,
            region_code,
        })
    }

    /// How many times the key pool has wrapped through a cool-down
    pub fn credential_wraps(&self) -> u64 {
        self.keys.wrap_count()
    }

    /// Make a GET request authenticated with the active key
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(url = %url, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.keys.current())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            warn!(url = %url, status = %status, error = %message, "Request failed");

            if status.as_u16() == 403 || status.as_u16() == 429 {
                return Err(ApiError::Quota {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::Decode)
    }
}

#[async_trait]
impl ChannelApi for YouTubeClient {
    async fn search_page(
        &mut self,
        term: &str,
        page_token: Option<&str>,
    ) -> ApiResult<SearchPage> {
        let max_results = SEARCH_PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("type", "channel"),
            ("q", term),
            ("maxResults", max_results.as_str()),
            ("regionCode", self.region_code.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: SearchListResponse = self.get("/search", &query).await?;

        Ok(SearchPage {
            channel_ids: response
                .items
                .into_iter()
                .map(|item| item.snippet.channel_id)
                .filter(|id| !id.is_empty())
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn channel_details(&mut self, ids: &[String]) -> ApiResult<Vec<ChannelItem>> {
        let id_list = ids.join(",");
        let query = [
            (
                "part",
                "snippet,statistics,brandingSettings,contentDetails,topicDetails",
            ),
            ("id", id_list.as_str()),
        ];

        let response: ChannelListResponse = self.get("/channels", &query).await?;
        Ok(response.items)
    }

    async fn recent_video_ids(
        &mut self,
        playlist_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<String>> {
        let max_results = max_results.to_string();
        let query = [
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];

        let response: PlaylistItemListResponse = self.get("/playlistItems", &query).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .filter(|id| !id.is_empty())
            .collect())
    }

    async fn comment_counts(&mut self, video_ids: &[String]) -> ApiResult<u64> {
        let id_list = video_ids.join(",");
        let query = [("part", "statistics"), ("id", id_list.as_str())];

        let response: VideoListResponse = self.get("/videos", &query).await?;

        Ok(response
            .items
            .iter()
            .map(|video| parse_count(&video.statistics.comment_count))
            .sum())
    }

    async fn rotate_credential(&mut self) {
        self.keys.rotate().await;
    }
}
