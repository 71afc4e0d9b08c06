//! Build-time enumeration of post routes

use serde::{Deserialize, Serialize};

use super::PageLoader;
use crate::cms::{CmsError, ContentRef, Query};
use crate::helpers::is_safe_slug;

/// Page size used while walking every post
const PATHS_PAGE_SIZE: usize = 100;

/// A post route known at build time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPath {
    pub slug: String,
    pub last_publication_date: Option<String>,
}

/// What the server does for a slug that was not precomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Render on demand before answering; 404 only when the CMS has no such post
    Blocking,
}

/// Fallback policy for unknown slugs
pub const FALLBACK: Fallback = Fallback::Blocking;

impl<'a> PageLoader<'a> {
    /// Every post route the CMS currently knows about, in API order
    pub async fn static_paths(&self) -> Result<Vec<StaticPath>, CmsError> {
        let query = Query::by_type(self.doc_type())
            .fetch(self.fields(&["uid"]))
            .page_size(PATHS_PAGE_SIZE)
            .with_ref(ContentRef::Master);

        let mut paths = Vec::new();
        let mut page = self.api.query(&query).await?;
        loop {
            for doc in page.results {
                match doc.uid {
                    Some(uid) if is_safe_slug(&uid) => paths.push(StaticPath {
                        slug: uid,
                        last_publication_date: doc.last_publication_date,
                    }),
                    other => {
                        tracing::warn!("Skipping document {} with unusable uid {:?}", doc.id, other)
                    }
                }
            }
            match page.next_page {
                Some(cursor) => page = self.api.next_page(&cursor).await?,
                None => break,
            }
        }

        tracing::debug!("Found {} static paths", paths.len());
        Ok(paths)
    }
}
