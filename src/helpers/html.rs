//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate an anchor id for a content section
///
/// # Examples
/// ```ignore
/// section_id("Proin et varius") // -> "proin-et-varius"
/// ```
pub fn section_id(heading: &str) -> String {
    slug::slugify(heading)
}
