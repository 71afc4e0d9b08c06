//! Map raw CMS documents to display models
//!
//! Mapping never fails: every field that is missing or malformed falls back
//! to an empty value.

use super::post::{ContentSection, PostDetail, PostNavigation, PostSummary};
use super::reading::{body_word_count, estimated_read_minutes};
use crate::cms::RawDocument;
use crate::helpers::{datetime_attr, post_path, section_id, DateFormatter};
use crate::richtext::{first_text_or_empty, text_or_empty};

/// Summary of one list result
pub fn map_summary(doc: &RawDocument, dates: &DateFormatter) -> PostSummary {
    let slug = doc.uid.clone().unwrap_or_default();
    PostSummary {
        path: if slug.is_empty() {
            String::new()
        } else {
            post_path(&slug)
        },
        slug,
        title: first_text_or_empty(doc.data.title.as_ref()),
        subtitle: first_text_or_empty(doc.data.subtitle.as_ref()),
        publication_date: dates.format_or_empty(doc.first_publication_date.as_deref()),
        author: first_text_or_empty(doc.data.author.as_ref()),
    }
}

/// Summaries of a whole batch, in source order
pub fn map_summaries(docs: &[RawDocument], dates: &DateFormatter) -> Vec<PostSummary> {
    docs.iter().map(|doc| map_summary(doc, dates)).collect()
}

/// Full page model of one document
pub fn map_detail(
    doc: &RawDocument,
    navigation: PostNavigation,
    dates: &DateFormatter,
    words_per_minute: u32,
) -> PostDetail {
    let content: Vec<ContentSection> = doc
        .data
        .content
        .iter()
        .map(|group| {
            let heading = text_or_empty(group.heading.as_ref());
            ContentSection {
                anchor: section_id(&heading),
                heading,
                body_html: group
                    .body
                    .as_ref()
                    .map(|body| body.to_html())
                    .unwrap_or_default(),
            }
        })
        .collect();

    let words = body_word_count(&doc.data.content);

    PostDetail {
        slug: doc.uid.clone().unwrap_or_default(),
        title: text_or_empty(doc.data.title.as_ref()),
        banner_url: doc
            .data
            .banner
            .as_ref()
            .and_then(|b| b.url.clone())
            .unwrap_or_default(),
        author: text_or_empty(doc.data.author.as_ref()),
        first_publication_date: dates.format_or_empty(doc.first_publication_date.as_deref()),
        first_publication_datetime: doc
            .first_publication_date
            .as_deref()
            .map(datetime_attr)
            .unwrap_or_default(),
        last_publication_date: edited_at(doc, dates),
        estimated_read_minutes: estimated_read_minutes(words, words_per_minute),
        content,
        navigation,
    }
}

/// Formatted edit date when the document changed after first publication
fn edited_at(doc: &RawDocument, dates: &DateFormatter) -> Option<String> {
    let first = doc.first_publication_date.as_deref()?;
    let last = doc.last_publication_date.as_deref()?;
    if first == last {
        return None;
    }
    dates.format(last)
}
