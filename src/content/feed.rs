//! Incremental "load more" pagination over the post list

use super::mapper::map_summaries;
use super::post::PostSummary;
use crate::cms::{ApiPage, CmsError, ContentApi, Cursor, Query};
use crate::helpers::DateFormatter;

/// Where the feed stands relative to the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    /// More posts can be fetched from this cursor
    HasMore(Cursor),
    /// A fetch for this cursor is in flight
    Loading(Cursor),
    /// The last page has been appended
    Exhausted,
}

/// Accumulated post list plus its pagination state
#[derive(Debug, Clone)]
pub struct PostFeed {
    posts: Vec<PostSummary>,
    state: FeedState,
}

impl PostFeed {
    /// Start a feed from the first page of results
    pub fn from_page(page: ApiPage, dates: &DateFormatter) -> Self {
        Self {
            posts: map_summaries(&page.results, dates),
            state: state_after(page.next_page),
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Cursor of the next page, if any
    pub fn next_cursor(&self) -> Option<&Cursor> {
        match &self.state {
            FeedState::HasMore(cursor) | FeedState::Loading(cursor) => Some(cursor),
            FeedState::Exhausted => None,
        }
    }

    pub fn has_more(&self) -> bool {
        matches!(self.state, FeedState::HasMore(_))
    }

    pub fn into_posts(self) -> Vec<PostSummary> {
        self.posts
    }

    /// Claim the next cursor
    ///
    /// Returns `None` while a load is already in flight or once exhausted,
    /// so overlapping triggers cannot append out of order.
    pub fn begin_load(&mut self) -> Option<Cursor> {
        match std::mem::replace(&mut self.state, FeedState::Exhausted) {
            FeedState::HasMore(cursor) => {
                self.state = FeedState::Loading(cursor.clone());
                Some(cursor)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Apply the outcome of the load started by [`begin_load`](Self::begin_load)
    ///
    /// On success the batch is appended as-is and the state follows the new
    /// cursor. On failure the feed goes back to the cursor it was loading.
    /// Returns the number of appended posts.
    pub fn finish_load(
        &mut self,
        result: Result<ApiPage, CmsError>,
        dates: &DateFormatter,
    ) -> Result<usize, CmsError> {
        let loading = match std::mem::replace(&mut self.state, FeedState::Exhausted) {
            FeedState::Loading(cursor) => cursor,
            other => {
                self.state = other;
                tracing::warn!("finish_load called without a load in flight");
                return result.map(|_| 0);
            }
        };

        match result {
            Ok(page) => {
                let batch = map_summaries(&page.results, dates);
                let appended = batch.len();
                self.posts.extend(batch);
                self.state = state_after(page.next_page);
                Ok(appended)
            }
            Err(err) => {
                self.state = FeedState::HasMore(loading);
                Err(err)
            }
        }
    }

    /// Fetch and append the next page; `Ok(0)` when there is nothing to load
    pub async fn load_more(
        &mut self,
        api: &dyn ContentApi,
        dates: &DateFormatter,
    ) -> Result<usize, CmsError> {
        let Some(cursor) = self.begin_load() else {
            return Ok(0);
        };
        let result = api.next_page(&cursor).await;
        self.finish_load(result, dates)
    }

    /// Run `query` and follow every cursor to the end
    pub async fn collect_all(
        api: &dyn ContentApi,
        query: &Query,
        dates: &DateFormatter,
    ) -> Result<Self, CmsError> {
        let mut feed = Self::from_page(api.query(query).await?, dates);
        while feed.has_more() {
            feed.load_more(api, dates).await?;
        }
        Ok(feed)
    }
}

fn state_after(next_page: Option<Cursor>) -> FeedState {
    match next_page {
        Some(cursor) => FeedState::HasMore(cursor),
        None => FeedState::Exhausted,
    }
}
