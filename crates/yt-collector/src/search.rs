//! Channel discovery via paginated keyword search.
//!
//! Walks search result pages for one term, enforcing the per-term cap and
//! global deduplication, pacing between pages, and rotating credentials on
//! quota/transport failures without consuming page budget.

use crate::api::{ApiError, ChannelApi};
use crate::state::CollectionState;
use anyhow::Result;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// A channel ID paired with the search term that surfaced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub channel_id: String,
    pub term: String,
}

/// Per-term search paginator
pub struct SearchPaginator<'a, A: ChannelApi> {
    api: &'a mut A,
    /// Maximum pages fetched per term
    max_pages: u32,
    /// Maximum channels attributed to one term
    per_term_cap: usize,
    /// Pacing delay between successful page fetches
    page_delay: Duration,
    /// Rotation budget before a failing fetch is surfaced
    max_rotations: u32,
}

impl<'a, A: ChannelApi> SearchPaginator<'a, A> {
    pub fn new(
        api: &'a mut A,
        max_pages: u32,
        per_term_cap: usize,
        page_delay: Duration,
        max_rotations: u32,
    ) -> Self {
        Self {
            api,
            max_pages,
            per_term_cap,
            page_delay,
            max_rotations,
        }
    }

    /// Collect new (channel ID, term) pairs for one term.
    ///
    /// `state` supplies the persisted dedup set and per-term counts;
    /// `pending` holds IDs discovered earlier in this run that have no
    /// record yet. Neither is mutated here; the caller merges the output.
    ///
    /// A term whose persisted count already meets the cap is skipped with
    /// zero fetches. Once the cap is reached mid-page, the rest of that page
    /// is discarded.
    pub async fn collect_term(
        &mut self,
        state: &CollectionState,
        pending: &HashSet<String>,
        term: &str,
    ) -> Result<Vec<Discovery>> {
        let already_collected = state.term_count(term);
        if already_collected >= self.per_term_cap {
            info!(
                term = term,
                collected = already_collected,
                "Term already at cap, skipping"
            );
            return Ok(Vec::new());
        }

        let mut found: Vec<Discovery> = Vec::new();
        let mut seen_this_term: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut pages_fetched = 0;
        let mut rotations = 0;

        while pages_fetched < self.max_pages {
            let page = match self.api.search_page(term, page_token.as_deref()).await {
                Ok(page) => {
                    rotations = 0;
                    page
                }
                Err(e) if e.should_rotate() && rotations < self.max_rotations => {
                    warn!(term = term, error = %e, "Search page failed, rotating credential");
                    self.api.rotate_credential().await;
                    rotations += 1;
                    // Retry the same page token; the failed request consumed
                    // no page budget
                    continue;
                }
                Err(e) => return Err(retry_budget_error(e, rotations)),
            };

            for channel_id in page.channel_ids {
                if found.len() + already_collected >= self.per_term_cap {
                    break;
                }
                if state.contains(&channel_id)
                    || pending.contains(&channel_id)
                    || !seen_this_term.insert(channel_id.clone())
                {
                    continue;
                }
                found.push(Discovery {
                    channel_id,
                    term: term.to_string(),
                });
            }

            pages_fetched += 1;

            if found.len() + already_collected >= self.per_term_cap {
                break;
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }

            sleep(self.page_delay).await;
        }

        info!(
            term = term,
            new_channels = found.len(),
            pages = pages_fetched,
            "Collected channel IDs for term"
        );

        Ok(found)
    }
}

/// Wrap an exhausted-retry failure with how far rotation got
fn retry_budget_error(e: ApiError, rotations: u32) -> anyhow::Error {
    anyhow::Error::new(e).context(format!(
        "remote call still failing after {} credential rotations",
        rotations
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiResult, ChannelItem, SearchPage};
    use async_trait::async_trait;
    use shared::ChannelRecord;

    /// Scripted search API: pages per term, with optional leading failures.
    struct ScriptedSearch {
        pages: Vec<Vec<String>>,
        failures_before_success: u32,
        calls: u32,
        rotations: u32,
    }

    impl ScriptedSearch {
        fn new(pages: Vec<Vec<String>>) -> Self {
            Self {
                pages,
                failures_before_success: 0,
                calls: 0,
                rotations: 0,
            }
        }

        fn failing(pages: Vec<Vec<String>>, failures: u32) -> Self {
            Self {
                failures_before_success: failures,
                ..Self::new(pages)
            }
        }
    }

    #[async_trait]
    impl ChannelApi for ScriptedSearch {
        async fn search_page(
            &mut self,
            _term: &str,
            page_token: Option<&str>,
        ) -> ApiResult<SearchPage> {
            self.calls += 1;
            if self.failures_before_success > 0 {
                self.failures_before_success -= 1;
                return Err(ApiError::Quota {
                    status: 403,
                    message: "quotaExceeded".to_string(),
                });
            }

            let index: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let ids = self.pages.get(index).cloned().unwrap_or_default();
            let next = if index + 1 < self.pages.len() {
                Some((index + 1).to_string())
            } else {
                None
            };
            Ok(SearchPage {
                channel_ids: ids,
                next_page_token: next,
            })
        }

        async fn channel_details(&mut self, _ids: &[String]) -> ApiResult<Vec<ChannelItem>> {
            unimplemented!("not used by paginator tests")
        }

        async fn recent_video_ids(
            &mut self,
            _playlist_id: &str,
            _max_results: u32,
        ) -> ApiResult<Vec<String>> {
            unimplemented!("not used by paginator tests")
        }

        async fn comment_counts(&mut self, _video_ids: &[String]) -> ApiResult<u64> {
            unimplemented!("not used by paginator tests")
        }

        async fn rotate_credential(&mut self) {
            self.rotations += 1;
        }
    }

    fn ids(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn record(channel_id: &str, term: &str) -> ChannelRecord {
        ChannelRecord {
            channel_id: channel_id.to_string(),
            search_term: term.to_string(),
            channel_name: String::new(),
            subscribers: 0,
            total_views: 0,
            video_count: 0,
            comment_count: 0,
            account_age_years: 0.0,
            description: String::new(),
            published_at: String::new(),
            country: String::new(),
            custom_url: String::new(),
            channel_keywords: String::new(),
            profile_country: String::new(),
            uploads_playlist_id: String::new(),
            topic_categories: String::new(),
            banner_url: String::new(),
            default_language: String::new(),
        }
    }

    #[tokio::test]
    async fn test_walks_pages_until_exhausted() {
        let mut api = ScriptedSearch::new(vec![ids("a", 50), ids("b", 30)]);
        let state = CollectionState::new();
        let pending = HashSet::new();

        let mut paginator = SearchPaginator::new(&mut api, 10, 500, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "term x")
            .await
            .unwrap();

        assert_eq!(found.len(), 80);
        assert_eq!(api.calls, 2);
    }

    #[tokio::test]
    async fn test_page_ceiling_bounds_fetches() {
        let pages: Vec<Vec<String>> = (0..6).map(|p| ids(&format!("p{}-", p), 50)).collect();
        let mut api = ScriptedSearch::new(pages);
        let state = CollectionState::new();
        let pending = HashSet::new();

        let mut paginator = SearchPaginator::new(&mut api, 3, 5_000, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "term x")
            .await
            .unwrap();

        assert_eq!(api.calls, 3);
        assert_eq!(found.len(), 150);
    }

    #[tokio::test]
    async fn test_cap_reached_mid_page_discards_rest() {
        let mut api = ScriptedSearch::new(vec![ids("a", 50), ids("b", 50)]);
        let mut state = CollectionState::new();
        // 55 already collected for this term: only 5 more fit under a cap of 60
        for i in 0..55 {
            state.insert(record(&format!("old{}", i), "term x"));
        }
        let pending = HashSet::new();

        let mut paginator = SearchPaginator::new(&mut api, 10, 60, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "term x")
            .await
            .unwrap();

        assert_eq!(found.len(), 5);
        // Cap hit on page one; page two is never requested
        assert_eq!(api.calls, 1);
    }

    #[tokio::test]
    async fn test_term_at_cap_is_skipped_without_fetching() {
        let mut api = ScriptedSearch::new(vec![ids("a", 50)]);
        let mut state = CollectionState::new();
        for i in 0..10 {
            state.insert(record(&format!("old{}", i), "term x"));
        }
        let pending = HashSet::new();

        let mut paginator = SearchPaginator::new(&mut api, 10, 10, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "term x")
            .await
            .unwrap();

        assert!(found.is_empty());
        assert_eq!(api.calls, 0);
    }

    #[tokio::test]
    async fn test_dedup_against_state_pending_and_self() {
        let mut page_two = ids("dup", 10);
        page_two.extend(ids("fresh", 5));
        page_two.push("collected0".to_string());
        page_two.push("a0".to_string()); // repeat from page one of this term
        let mut api = ScriptedSearch::new(vec![ids("a", 3), page_two]);

        let mut state = CollectionState::new();
        state.insert(record("collected0", "term w"));
        let pending: HashSet<String> = ids("dup", 10).into_iter().collect();

        let mut paginator = SearchPaginator::new(&mut api, 10, 500, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "term x")
            .await
            .unwrap();

        let found_ids: Vec<&str> = found.iter().map(|d| d.channel_id.as_str()).collect();
        assert_eq!(found_ids.len(), 8); // a0 a1 a2 + fresh0..4
        assert!(found_ids.contains(&"fresh4"));
        assert!(!found_ids.contains(&"dup0"));
        assert!(!found_ids.contains(&"collected0"));
    }

    /// Two pages of 50 where 10 of page two were surfaced by an earlier
    /// term: exactly 90 pairs come back.
    #[tokio::test]
    async fn test_cross_term_overlap_scenario() {
        let mut page_two = ids("other-", 10);
        page_two.extend(ids("x2-", 40));
        let mut api = ScriptedSearch::new(vec![ids("x1-", 50), page_two]);

        let state = CollectionState::new();
        let pending: HashSet<String> = ids("other-", 10).into_iter().collect();

        let mut paginator = SearchPaginator::new(&mut api, 10, 500, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "X")
            .await
            .unwrap();

        assert_eq!(found.len(), 90);
        assert!(found.iter().all(|d| d.term == "X"));
    }

    #[tokio::test]
    async fn test_failure_rotates_and_retries_same_page() {
        let mut api = ScriptedSearch::failing(vec![ids("a", 20)], 3);
        let state = CollectionState::new();
        let pending = HashSet::new();

        let mut paginator = SearchPaginator::new(&mut api, 10, 500, Duration::ZERO, 10);
        let found = paginator
            .collect_term(&state, &pending, "term x")
            .await
            .unwrap();

        assert_eq!(found.len(), 20);
        assert_eq!(api.rotations, 3);
        // 3 failed attempts + 1 successful fetch of the same page
        assert_eq!(api.calls, 4);
    }

    #[tokio::test]
    async fn test_rotation_budget_exhaustion_surfaces_error() {
        let mut api = ScriptedSearch::failing(vec![ids("a", 20)], 100);
        let state = CollectionState::new();
        let pending = HashSet::new();

        let mut paginator = SearchPaginator::new(&mut api, 10, 500, Duration::ZERO, 4);
        let result = paginator.collect_term(&state, &pending, "term x").await;

        assert!(result.is_err());
        assert_eq!(api.rotations, 4);
    }
}
