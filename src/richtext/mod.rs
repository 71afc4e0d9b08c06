//! Prismic-style rich text
//!
//! A rich text field is a list of blocks (paragraphs, headings, list items,
//! images, embeds). Each text block carries inline spans addressed by
//! character offsets. Key-text fields arrive as a bare string and are
//! accepted wherever rich text is.

mod html;

pub use html::as_html;

use serde::{Deserialize, Serialize};

/// A text field as stored in the CMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichField {
    /// Key-text field
    Plain(String),
    /// Structured text field
    Blocks(Vec<Block>),
}

/// A single block of structured text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline formatting over `text[start..end]` (char offsets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// Payload of hyperlink and label spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
}

impl RichField {
    /// All block texts joined by a space
    pub fn as_text(&self) -> String {
        match self {
            RichField::Plain(text) => text.clone(),
            RichField::Blocks(blocks) => blocks
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Text of the first block only
    pub fn first_text(&self) -> String {
        match self {
            RichField::Plain(text) => text.clone(),
            RichField::Blocks(blocks) => blocks
                .first()
                .map(|b| b.text.clone())
                .unwrap_or_default(),
        }
    }

    /// Render as HTML; a plain field becomes one paragraph
    pub fn to_html(&self) -> String {
        match self {
            RichField::Plain(text) if text.is_empty() => String::new(),
            RichField::Plain(text) => as_html(&[Block::paragraph(text.clone())]),
            RichField::Blocks(blocks) => as_html(blocks),
        }
    }

    /// Number of whitespace separated words over every block
    pub fn word_count(&self) -> usize {
        match self {
            RichField::Plain(text) => text.split_whitespace().count(),
            RichField::Blocks(blocks) => blocks
                .iter()
                .map(|b| b.text.split_whitespace().count())
                .sum(),
        }
    }
}

/// `as_text` of an optional field, empty when absent
pub fn text_or_empty(field: Option<&RichField>) -> String {
    field.map(RichField::as_text).unwrap_or_default()
}

/// `first_text` of an optional field, empty when absent
pub fn first_text_or_empty(field: Option<&RichField>) -> String {
    field.map(RichField::first_text).unwrap_or_default()
}
