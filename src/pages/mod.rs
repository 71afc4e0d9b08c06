//! Page loaders: fetch from the content API and map to display models
//!
//! Every page render builds fresh models from the latest API response.
//! The loader only borrows its collaborators, so one client instance is
//! shared by the generator, the server and the tests.

mod home;
mod paths;
mod post;

pub use home::HomePage;
pub use paths::{Fallback, StaticPath, FALLBACK};
pub use post::PostPage;

use crate::cms::{CmsError, ContentApi, ContentRef};
use crate::config::SiteConfig;
use crate::helpers::{post_path, DateFormatter};

/// Loads page data from the content API
pub struct PageLoader<'a> {
    api: &'a dyn ContentApi,
    config: &'a SiteConfig,
    dates: &'a DateFormatter,
}

impl<'a> PageLoader<'a> {
    pub fn new(api: &'a dyn ContentApi, config: &'a SiteConfig, dates: &'a DateFormatter) -> Self {
        Self { api, config, dates }
    }

    fn doc_type(&self) -> &str {
        &self.config.cms.document_type
    }

    /// `posts.title`-style projection for the configured type
    fn fields(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .map(|name| format!("{}.{}", self.doc_type(), name))
            .collect()
    }

    /// Route a preview session should land on
    ///
    /// Returns `None` when the previewed document is unknown or is not a
    /// post; callers send those to the home page.
    pub async fn preview_path(
        &self,
        document_id: &str,
        token: &str,
    ) -> Result<Option<String>, CmsError> {
        let content_ref = ContentRef::Preview(token.to_string());
        let doc = self.api.get_by_id(document_id, &content_ref).await?;
        Ok(doc
            .filter(|d| d.doc_type == self.doc_type())
            .and_then(|d| d.uid)
            .map(|uid| post_path(&uid)))
    }
}
