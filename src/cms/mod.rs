//! Content API boundary
//!
//! Everything that talks to the headless CMS goes through [`ContentApi`].
//! A client instance is built once and passed explicitly to every loader,
//! which lets tests swap in [`memory::InMemoryApi`].

mod client;
mod error;
pub mod memory;
mod response;
mod retry;
mod types;

pub use client::PrismicClient;
pub use error::CmsError;
pub use retry::RetryPolicy;
pub use types::{ApiPage, ContentGroup, Cursor, Image, PartialPost, RawDocument};

use async_trait::async_trait;

/// Which content release to read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentRef {
    /// The published content
    #[default]
    Master,
    /// A preview session, identified by its signed ref token
    Preview(String),
}

impl ContentRef {
    pub fn is_preview(&self) -> bool {
        matches!(self, ContentRef::Preview(_))
    }
}

/// Query filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[at(document.type, "...")]`
    DocumentType(String),
    /// `[at(my.<type>.uid, "...")]`
    Uid { doc_type: String, uid: String },
    /// `[at(document.id, "...")]`
    Id(String),
}

impl Predicate {
    /// Prismic predicate syntax
    pub fn to_query_string(&self) -> String {
        match self {
            Predicate::DocumentType(t) => format!("[at(document.type,\"{}\")]", quote(t)),
            Predicate::Uid { doc_type, uid } => {
                format!("[at(my.{}.uid,\"{}\")]", doc_type, quote(uid))
            }
            Predicate::Id(id) => format!("[at(document.id,\"{}\")]", quote(id)),
        }
    }
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Document metadata usable in orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    FirstPublicationDate,
    LastPublicationDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: OrderField,
    pub direction: Direction,
}

impl Ordering {
    pub fn asc(field: OrderField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: OrderField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// Prismic ordering syntax, e.g. `document.last_publication_date desc`
    pub fn to_query_string(&self) -> String {
        let field = match self.field {
            OrderField::FirstPublicationDate => "document.first_publication_date",
            OrderField::LastPublicationDate => "document.last_publication_date",
        };
        match self.direction {
            Direction::Asc => field.to_string(),
            Direction::Desc => format!("{} desc", field),
        }
    }
}

/// A search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    /// Field projection, e.g. `posts.title`; empty fetches everything
    pub fetch: Vec<String>,
    pub page_size: usize,
    pub orderings: Vec<Ordering>,
    /// Only return documents that come after this document id
    pub after: Option<String>,
    pub content_ref: ContentRef,
}

impl Query {
    /// All documents of one type
    pub fn by_type(doc_type: &str) -> Self {
        Self {
            predicates: vec![Predicate::DocumentType(doc_type.to_string())],
            fetch: Vec::new(),
            page_size: 20,
            orderings: Vec::new(),
            after: None,
            content_ref: ContentRef::Master,
        }
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.orderings.push(ordering);
        self
    }

    pub fn after(mut self, document_id: impl Into<String>) -> Self {
        self.after = Some(document_id.into());
        self
    }

    pub fn with_ref(mut self, content_ref: ContentRef) -> Self {
        self.content_ref = content_ref;
        self
    }

    /// `q` parameter: all predicates combined
    pub fn predicates_string(&self) -> String {
        let inner: String = self
            .predicates
            .iter()
            .map(Predicate::to_query_string)
            .collect();
        format!("[{}]", inner)
    }

    /// `orderings` parameter, `None` when unordered
    pub fn orderings_string(&self) -> Option<String> {
        if self.orderings.is_empty() {
            return None;
        }
        let inner: Vec<String> = self
            .orderings
            .iter()
            .map(Ordering::to_query_string)
            .collect();
        Some(format!("[{}]", inner.join(",")))
    }
}

/// Read access to the CMS
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Run a search and return its first page
    async fn query(&self, query: &Query) -> Result<ApiPage, CmsError>;

    /// Fetch the page a previous response pointed at
    async fn next_page(&self, cursor: &Cursor) -> Result<ApiPage, CmsError>;

    /// Look a document up by its custom type and uid
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        content_ref: &ContentRef,
    ) -> Result<Option<RawDocument>, CmsError> {
        let query = Query {
            predicates: vec![Predicate::Uid {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            }],
            fetch: Vec::new(),
            page_size: 1,
            orderings: Vec::new(),
            after: None,
            content_ref: content_ref.clone(),
        };
        Ok(self.query(&query).await?.results.into_iter().next())
    }

    /// Look a document up by id
    async fn get_by_id(
        &self,
        id: &str,
        content_ref: &ContentRef,
    ) -> Result<Option<RawDocument>, CmsError> {
        let query = Query {
            predicates: vec![Predicate::Id(id.to_string())],
            fetch: Vec::new(),
            page_size: 1,
            orderings: Vec::new(),
            after: None,
            content_ref: content_ref.clone(),
        };
        Ok(self.query(&query).await?.results.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_string() {
        let query = Query::by_type("posts");
        assert_eq!(query.predicates_string(), r#"[[at(document.type,"posts")]]"#);

        let uid = Predicate::Uid {
            doc_type: "posts".into(),
            uid: "say \"hi\"".into(),
        };
        assert_eq!(
            uid.to_query_string(),
            r#"[at(my.posts.uid,"say \"hi\"")]"#
        );
    }

    #[test]
    fn test_orderings_string() {
        let query = Query::by_type("posts");
        assert_eq!(query.orderings_string(), None);

        let query = query
            .order_by(Ordering::desc(OrderField::LastPublicationDate))
            .order_by(Ordering::asc(OrderField::FirstPublicationDate));
        assert_eq!(
            query.orderings_string().as_deref(),
            Some("[document.last_publication_date desc,document.first_publication_date]")
        );
    }

    #[test]
    fn test_builder() {
        let query = Query::by_type("posts")
            .fetch(["posts.title", "posts.subtitle"])
            .page_size(0)
            .after("YEx9")
            .with_ref(ContentRef::Preview("token".into()));
        assert_eq!(query.fetch, vec!["posts.title", "posts.subtitle"]);
        assert_eq!(query.page_size, 1);
        assert_eq!(query.after.as_deref(), Some("YEx9"));
        assert!(query.content_ref.is_preview());
    }
}
