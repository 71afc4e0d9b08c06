//! Rich text to HTML serializer

use super::{Block, BlockKind, Span, SpanKind};
use crate::helpers::{html_escape, post_path};

/// Serialize blocks to HTML
///
/// Block text is escaped. Embed markup is CMS-provided and passed through
/// unchanged.
pub fn as_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut i = 0;

    while i < blocks.len() {
        match blocks[i].kind {
            kind @ (BlockKind::ListItem | BlockKind::OrderedListItem) => {
                let tag = if kind == BlockKind::ListItem { "ul" } else { "ol" };
                out.push_str(&format!("<{}>", tag));
                while i < blocks.len() && blocks[i].kind == kind {
                    out.push_str(&format!("<li>{}</li>", render_text(&blocks[i])));
                    i += 1;
                }
                out.push_str(&format!("</{}>", tag));
            }
            _ => {
                out.push_str(&render_block(&blocks[i]));
                i += 1;
            }
        }
    }

    out
}

fn render_block(block: &Block) -> String {
    let heading = |level: u8| format!("<h{0}>{1}</h{0}>", level, render_text(block));

    match block.kind {
        BlockKind::Heading1 => heading(1),
        BlockKind::Heading2 => heading(2),
        BlockKind::Heading3 => heading(3),
        BlockKind::Heading4 => heading(4),
        BlockKind::Heading5 => heading(5),
        BlockKind::Heading6 => heading(6),
        BlockKind::Paragraph => format!("<p>{}</p>", render_text(block)),
        BlockKind::Preformatted => format!("<pre>{}</pre>", render_text(block)),
        BlockKind::Image => match &block.url {
            Some(url) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(url),
                html_escape(block.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        BlockKind::Embed => match &block.oembed {
            Some(embed) => format!(
                r#"<div data-oembed="{}">{}</div>"#,
                html_escape(embed.embed_url.as_deref().unwrap_or("")),
                embed.html.as_deref().unwrap_or("")
            ),
            None => String::new(),
        },
        BlockKind::ListItem | BlockKind::OrderedListItem => {
            format!("<li>{}</li>", render_text(block))
        }
        BlockKind::Unknown if block.text.is_empty() => String::new(),
        BlockKind::Unknown => format!("<p>{}</p>", render_text(block)),
    }
}

/// Render block text with its spans
///
/// The text is cut into segments over which the set of active spans is
/// constant. Tags are closed and reopened at segment borders as needed so
/// overlapping spans still produce well-nested markup.
fn render_text(block: &Block) -> String {
    let chars: Vec<char> = block.text.chars().collect();
    let len = chars.len();

    let mut spans: Vec<&Span> = block
        .spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut cuts: Vec<usize> = vec![0, len];
    for span in &spans {
        cuts.push(span.start);
        cuts.push(span.end.min(len));
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::new();
    let mut open: Vec<&Span> = Vec::new();

    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active: Vec<&Span> = spans
            .iter()
            .copied()
            .filter(|s| s.start <= from && s.end >= to)
            .collect();

        let keep = open
            .iter()
            .zip(active.iter())
            .take_while(|(a, b)| std::ptr::eq(**a, **b))
            .count();
        while open.len() > keep {
            if let Some(span) = open.pop() {
                out.push_str(close_tag(span));
            }
        }
        for span in &active[keep..] {
            out.push_str(&open_tag(span));
            open.push(*span);
        }

        let segment: String = chars[from..to].iter().collect();
        out.push_str(&html_escape(&segment).replace('\n', "<br />"));
    }

    while let Some(span) = open.pop() {
        out.push_str(close_tag(span));
    }

    out
}

fn open_tag(span: &Span) -> String {
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let data = span.data.clone().unwrap_or_default();
            let href = match (data.link_type.as_deref(), data.uid.as_deref()) {
                (Some("Document"), Some(uid)) => post_path(uid),
                _ => data.url.unwrap_or_default(),
            };
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    html_escape(&href),
                    html_escape(&target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(&href)),
            }
        }
        SpanKind::Label => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or("");
            format!(r#"<span class="{}">"#, html_escape(label))
        }
        SpanKind::Unknown => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label | SpanKind::Unknown => "</span>",
    }
}
