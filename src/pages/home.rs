//! Home page: the first batch of post summaries

use serde::Serialize;

use super::PageLoader;
use crate::cms::{CmsError, ContentRef, Cursor, OrderField, Ordering, Query};
use crate::content::{map_summaries, PostSummary};

/// One batch of the post list
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomePage {
    pub results: Vec<PostSummary>,
    /// `null` on the last batch
    pub next_page: Option<Cursor>,
}

impl<'a> PageLoader<'a> {
    /// Query for the first page of the post list
    pub fn home_query(&self, content_ref: &ContentRef) -> Query {
        Query::by_type(self.doc_type())
            .fetch(self.fields(&["title", "subtitle", "author"]))
            .page_size(self.config.per_page)
            .order_by(Ordering::desc(OrderField::FirstPublicationDate))
            .with_ref(content_ref.clone())
    }

    /// Newest posts, first page
    pub async fn home(&self, content_ref: &ContentRef) -> Result<HomePage, CmsError> {
        let page = self.api.query(&self.home_query(content_ref)).await?;
        tracing::debug!(
            "Home page: {} posts, more: {}",
            page.results.len(),
            page.next_page.is_some()
        );
        Ok(HomePage {
            results: map_summaries(&page.results, self.dates),
            next_page: page.next_page,
        })
    }

    /// The batch behind a "load more" cursor
    pub async fn more(&self, cursor: &Cursor) -> Result<HomePage, CmsError> {
        let page = self.api.next_page(cursor).await?;
        Ok(HomePage {
            results: map_summaries(&page.results, self.dates),
            next_page: page.next_page,
        })
    }
}
