//! Display models for posts

use serde::{Deserialize, Serialize};

/// A post as shown in the home page list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    /// Route of the detail page, empty when the document has no slug
    #[serde(default)]
    pub path: String,
    pub title: String,
    pub subtitle: String,
    /// Already formatted for display
    pub publication_date: String,
    pub author: String,
}

/// A post as shown on its own page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub slug: String,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    /// Formatted first publication date
    pub first_publication_date: String,
    /// Raw timestamp for `<time datetime>`
    pub first_publication_datetime: String,
    /// Formatted edit date, only when the post changed after publication
    pub last_publication_date: Option<String>,
    pub estimated_read_minutes: u32,
    pub content: Vec<ContentSection>,
    pub navigation: PostNavigation,
}

/// One heading with its body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentSection {
    pub heading: String,
    /// Anchor id derived from the heading
    pub anchor: String,
    /// Trusted HTML rendered from CMS rich text
    pub body_html: String,
}

/// Links to the neighbouring posts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostNavigation {
    pub previous: Option<PostLink>,
    pub next: Option<PostLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostLink {
    pub slug: String,
    pub title: String,
    pub path: String,
}

impl PostLink {
    pub fn new(slug: String, title: String) -> Self {
        let path = crate::helpers::post_path(&slug);
        Self { slug, title, path }
    }
}
