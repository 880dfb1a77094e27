//! Catalogue page template.
//!
//! All assumptions about the catalogue's HTML live behind [`PageTemplate`].
//! [`SpringerLinkTemplate`] matches the SpringerLink book page layout with
//! regexes; a markup change on the site means swapping this one component.

use std::sync::LazyLock;

use regex::Regex;

use crate::link::compile_static_regex;

/// Extracts the pieces of a catalogue page the crawler needs.
pub trait PageTemplate: Send + Sync {
    /// True when the page body is an explicit access denial.
    fn is_access_denied(&self, html: &str) -> bool;

    /// Book title, with the subtitle appended after ` - ` when present.
    ///
    /// Returns `None` when the heading is missing or blank.
    fn title(&self, html: &str) -> Option<String>;

    /// Identifier of the cover image, if the page shows one.
    fn cover_id(&self, html: &str) -> Option<String>;

    /// Every PDF href on the page, in document order, entity-decoded.
    fn pdf_links(&self, html: &str) -> Vec<String>;

    /// Target of the "next page" link, entity-decoded.
    fn next_page(&self, html: &str) -> Option<String>;
}

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"<h1[^<]+class="title">([^<]+)(?:<br\s*/?>\s*<span class="subtitle">([^<]+)</span>\s*)?</h1>"#,
    )
});
static COVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"<div class="coverImage" style="background-image: url\(/content/([^/]+)/cover-medium\.gif\)">"#,
    )
});
static PDF_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"href="([^"]+\.pdf)""#));
static NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<a href="([^"]+)">Next</a>"#));

const ACCESS_DENIED_MARKER: &str = "403 Forbidden";

/// Template for the SpringerLink book catalogue page.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpringerLinkTemplate;

impl PageTemplate for SpringerLinkTemplate {
    fn is_access_denied(&self, html: &str) -> bool {
        html.contains(ACCESS_DENIED_MARKER)
    }

    fn title(&self, html: &str) -> Option<String> {
        let caps = TITLE_RE.captures(html)?;
        let title = decode_entities(caps.get(1)?.as_str().trim());
        if title.trim().is_empty() {
            return None;
        }
        let subtitle = caps
            .get(2)
            .map(|m| decode_entities(m.as_str().trim()))
            .filter(|s| !s.trim().is_empty());
        Some(match subtitle {
            Some(subtitle) => format!("{title} - {subtitle}"),
            None => title,
        })
    }

    fn cover_id(&self, html: &str) -> Option<String> {
        COVER_RE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn pdf_links(&self, html: &str) -> Vec<String> {
        PDF_HREF_RE
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str()))
            .collect()
    }

    fn next_page(&self, html: &str) -> Option<String> {
        NEXT_RE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str()))
    }
}

/// Decodes the handful of HTML entities that appear in hrefs and headings.
#[must_use]
pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
