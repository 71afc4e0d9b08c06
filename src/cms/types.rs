//! Raw document shapes returned by the content API
//!
//! Every field of a post document is optional and parsed leniently: a field
//! that is missing or has an unexpected shape becomes `None` instead of
//! failing the whole document (or the whole batch).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::richtext::RichField;

/// Opaque next-page cursor handed out by the content API
///
/// Forwarded verbatim, never parsed or built by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiPage {
    /// Absent on the final page
    #[serde(default)]
    pub next_page: Option<Cursor>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<RawDocument>,
}

/// A document as stored in the CMS
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub uid: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_or_default")]
    pub doc_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub first_publication_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_publication_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub data: PartialPost,
}

/// The `data` of a post document, with every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPost {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<RichField>,
    #[serde(default, deserialize_with = "lenient")]
    pub subtitle: Option<RichField>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<RichField>,
    #[serde(default, deserialize_with = "lenient")]
    pub banner: Option<Image>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub content: Vec<ContentGroup>,
}

/// Image field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One repeatable `content` group: a heading and a rich text body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentGroup {
    #[serde(default, deserialize_with = "lenient")]
    pub heading: Option<RichField>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<RichField>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Keeps the well-formed entries of a list, drops the rest
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_become_none() {
        let doc: RawDocument = serde_json::from_value(json!({
            "id": "X1",
            "uid": "hello",
            "type": "posts",
            "data": { "title": "Hello" }
        }))
        .unwrap();

        assert_eq!(doc.uid.as_deref(), Some("hello"));
        assert_eq!(doc.data.title, Some(RichField::Plain("Hello".to_string())));
        assert!(doc.data.subtitle.is_none());
        assert!(doc.data.banner.is_none());
        assert!(doc.data.content.is_empty());
        assert!(doc.first_publication_date.is_none());
    }

    #[test]
    fn test_malformed_field_does_not_fail_document() {
        let doc: RawDocument = serde_json::from_value(json!({
            "id": "X2",
            "data": {
                "title": 42,
                "author": { "unexpected": true },
                "banner": "not an image",
                "content": [
                    { "heading": "Ok", "body": [] },
                    "garbage",
                    { "heading": ["nope"] }
                ]
            }
        }))
        .unwrap();

        assert!(doc.data.title.is_none());
        assert!(doc.data.author.is_none());
        assert!(doc.data.banner.is_none());
        assert_eq!(doc.data.content.len(), 2);
        assert_eq!(
            doc.data.content[0].heading,
            Some(RichField::Plain("Ok".to_string()))
        );
        assert!(doc.data.content[1].heading.is_none());
    }

    #[test]
    fn test_null_data_defaults() {
        let doc: RawDocument = serde_json::from_value(json!({ "id": "X3", "data": null })).unwrap();
        assert_eq!(doc.data, PartialPost::default());
    }

    #[test]
    fn test_page_without_cursor() {
        let page: ApiPage = serde_json::from_value(json!({
            "page": 1,
            "next_page": null,
            "results": [{ "id": "A" }]
        }))
        .unwrap();
        assert!(page.next_page.is_none());
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn test_malformed_metadata_keeps_document() {
        let page: ApiPage = serde_json::from_value(json!({
            "results": [
                { "id": "A", "uid": "a", "type": "posts" },
                { "id": "B", "uid": "b", "type": "posts", "first_publication_date": 1615766400 },
                { "id": 7, "uid": ["c"], "type": null, "last_publication_date": {} },
                "not a document"
            ]
        }))
        .unwrap();

        assert_eq!(page.results.len(), 3);
        assert_eq!(page.results[1].uid.as_deref(), Some("b"));
        assert!(page.results[1].first_publication_date.is_none());

        let broken = &page.results[2];
        assert_eq!(broken.id, "");
        assert!(broken.uid.is_none());
        assert_eq!(broken.doc_type, "");
        assert!(broken.last_publication_date.is_none());
    }
}
