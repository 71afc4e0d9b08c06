//! Post page: one document plus its neighbours

use super::PageLoader;
use crate::cms::{CmsError, ContentRef, Direction, OrderField, Ordering, Query, RawDocument};
use crate::content::{map_detail, PostDetail, PostLink, PostNavigation};
use crate::richtext::text_or_empty;

/// Outcome of loading a post page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostPage {
    Found(Box<PostDetail>),
    NotFound,
}

impl<'a> PageLoader<'a> {
    /// Load the post behind `slug`
    ///
    /// An unknown slug yields [`PostPage::NotFound`] without any neighbour
    /// lookups. Neighbour lookups that fail only drop the link.
    pub async fn post(&self, slug: &str, content_ref: &ContentRef) -> Result<PostPage, CmsError> {
        let Some(doc) = self
            .api
            .get_by_uid(self.doc_type(), slug, content_ref)
            .await?
        else {
            tracing::debug!("Post not found: {}", slug);
            return Ok(PostPage::NotFound);
        };

        let (previous, next) = tokio::join!(
            self.neighbour(&doc, Direction::Desc, content_ref),
            self.neighbour(&doc, Direction::Asc, content_ref),
        );

        let detail = map_detail(
            &doc,
            PostNavigation { previous, next },
            self.dates,
            self.config.words_per_minute,
        );
        Ok(PostPage::Found(Box::new(detail)))
    }

    /// The post right before (`Desc`) or after (`Asc`) `doc` by last edit
    async fn neighbour(
        &self,
        doc: &RawDocument,
        direction: Direction,
        content_ref: &ContentRef,
    ) -> Option<PostLink> {
        let query = Query::by_type(self.doc_type())
            .fetch(self.fields(&["title"]))
            .page_size(1)
            .order_by(Ordering {
                field: OrderField::LastPublicationDate,
                direction,
            })
            .after(doc.id.clone())
            .with_ref(content_ref.clone());

        match self.api.query(&query).await {
            Ok(page) => page.results.into_iter().next().and_then(|n| {
                let slug = n.uid?;
                Some(PostLink::new(slug, text_or_empty(n.data.title.as_ref())))
            }),
            Err(e) => {
                tracing::warn!("Neighbour lookup for {} failed: {}", doc.id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::InMemoryApi;
    use crate::config::SiteConfig;
    use crate::helpers::DateFormatter;
    use crate::richtext::RichField;

    fn doc(id: &str, title: &str, last: &str) -> RawDocument {
        let mut doc = RawDocument {
            id: id.to_string(),
            uid: Some(id.to_lowercase()),
            doc_type: "posts".to_string(),
            first_publication_date: Some(last.to_string()),
            last_publication_date: Some(last.to_string()),
            ..RawDocument::default()
        };
        doc.data.title = Some(RichField::Plain(title.to_string()));
        doc
    }

    fn api() -> InMemoryApi {
        InMemoryApi::new(vec![
            doc("A", "Alpha", "2021-03-01T00:00:00+0000"),
            doc("B", "Beta", "2021-03-02T00:00:00+0000"),
            doc("C", "Gamma", "2021-03-03T00:00:00+0000"),
        ])
    }

    #[tokio::test]
    async fn test_found_with_both_neighbours() {
        let api = api();
        let config = SiteConfig::default();
        let dates = DateFormatter::default();
        let loader = PageLoader::new(&api, &config, &dates);

        let page = loader.post("b", &ContentRef::Master).await.unwrap();
        let PostPage::Found(detail) = page else {
            panic!("expected a post");
        };
        assert_eq!(detail.title, "Beta");
        assert_eq!(
            detail.navigation.previous,
            Some(PostLink::new("a".into(), "Alpha".into()))
        );
        assert_eq!(
            detail.navigation.next,
            Some(PostLink::new("c".into(), "Gamma".into()))
        );
        assert_eq!(api.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_first_post_has_no_previous() {
        let api = api();
        let config = SiteConfig::default();
        let dates = DateFormatter::default();
        let loader = PageLoader::new(&api, &config, &dates);

        let PostPage::Found(detail) = loader.post("a", &ContentRef::Master).await.unwrap() else {
            panic!("expected a post");
        };
        assert_eq!(detail.navigation.previous, None);
        assert_eq!(detail.navigation.next.map(|n| n.slug).as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_unknown_slug_issues_no_neighbour_queries() {
        let api = api();
        let config = SiteConfig::default();
        let dates = DateFormatter::default();
        let loader = PageLoader::new(&api, &config, &dates);

        let page = loader.post("missing", &ContentRef::Master).await.unwrap();
        assert_eq!(page, PostPage::NotFound);

        let queries = api.queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].after.is_none());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_an_error() {
        let api = api();
        api.fail_next(1);
        let config = SiteConfig::default();
        let dates = DateFormatter::default();
        let loader = PageLoader::new(&api, &config, &dates);

        let result = loader.post("b", &ContentRef::Master).await;
        assert!(matches!(result, Err(CmsError::Network(_))));
    }

    #[tokio::test]
    async fn test_neighbour_failure_degrades_to_no_link() {
        let api = api();
        let config = SiteConfig::default();
        let dates = DateFormatter::default();
        let loader = PageLoader::new(&api, &config, &dates);
        let current = doc("B", "Beta", "2021-03-02T00:00:00+0000");

        api.fail_next(1);
        let link = loader
            .neighbour(&current, Direction::Asc, &ContentRef::Master)
            .await;
        assert_eq!(link, None);
    }
}
