//! Resolution of user input into a canonical catalogue entry.
//!
//! Accepts either a full SpringerLink book URL or the bare content code that
//! identifies the book, and produces a [`CatalogueIdentity`] whose base URL is
//! `<site-root>/content/<code>/`. Relative chapter links found while crawling
//! are resolved against that identity.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::BookError;

/// Site root used when no override is configured.
pub const DEFAULT_SITE_ROOT: &str = "http://springerlink.com";

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r"^(?:https?://)?(?:www\.)?springer(?:link)?\.(?:com|de)/(?:content|.*book)/(?P<code>[a-z0-9\-]+)/?(?:\?[^/]*)?$",
    )
});
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"^[a-z0-9\-]+$"));
static PARENT_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"/[^/]+/\.\."));

/// Parses [`DEFAULT_SITE_ROOT`].
///
/// # Panics
///
/// Never in practice; the constant is a valid URL.
#[must_use]
pub fn default_site_root() -> Url {
    Url::parse(DEFAULT_SITE_ROOT)
        .unwrap_or_else(|e| panic!("invalid default site root '{DEFAULT_SITE_ROOT}': {e}"))
}

/// The catalogue entry a run operates on. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueIdentity {
    code: String,
    site_root: Url,
    base_url: Url,
}

impl CatalogueIdentity {
    /// Builds the identity for a validated content code under `site_root`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::InvalidLink`] if `code` is not lower-case
    /// alphanumerics and hyphens, or cannot be joined onto `site_root`.
    pub fn new(code: &str, site_root: &Url) -> Result<Self, BookError> {
        if !CODE_RE.is_match(code) {
            return Err(BookError::invalid_link(code));
        }
        let site_root = site_root
            .join("/")
            .map_err(|_| BookError::invalid_link(site_root.as_str()))?;
        let base_url = site_root
            .join(&format!("/content/{code}/"))
            .map_err(|_| BookError::invalid_link(code))?;
        Ok(Self {
            code: code.to_string(),
            site_root,
            base_url,
        })
    }

    /// The content code extracted from the input.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Canonical entry URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Site root (`scheme://host/`).
    #[must_use]
    pub fn site_root(&self) -> &Url {
        &self.site_root
    }

    /// First page of the chapter listing.
    #[must_use]
    pub fn contents_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}contents/", self.base_url.path()));
        url
    }

    /// True when `url` lives on the same host and port as the catalogue.
    #[must_use]
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.site_root.scheme()
            && url.host_str() == self.site_root.host_str()
            && url.port_or_known_default() == self.site_root.port_or_known_default()
    }

    /// Resolves an href found on a catalogue page to an absolute URL.
    ///
    /// Absolute hrefs are kept as-is. Hrefs starting with `/` are joined onto
    /// the site root, anything else onto the entry base URL. `/segment/..`
    /// pairs are collapsed afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::InvalidLink`] if the result is not a valid URL.
    pub fn resolve_href(&self, href: &str) -> Result<Url, BookError> {
        if let Ok(absolute) = Url::parse(href) {
            return Ok(absolute);
        }
        let joined = if href.starts_with('/') {
            format!("{}{href}", self.site_root.as_str().trim_end_matches('/'))
        } else {
            format!("{}{href}", self.base_url.as_str())
        };
        let collapsed = collapse_parent_segments(&joined);
        Url::parse(&collapsed).map_err(|_| BookError::invalid_link(href))
    }
}

/// Removes `/segment/..` pairs until none remain.
#[must_use]
pub fn collapse_parent_segments(url: &str) -> String {
    let mut current = url.to_string();
    loop {
        let next = PARENT_SEGMENT_RE.replace(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Extracts the content code from a SpringerLink book URL.
///
/// # Errors
///
/// Returns [`BookError::InvalidLink`] when the URL does not match.
pub fn parse_link(link: &str) -> Result<String, BookError> {
    LINK_RE
        .captures(link.trim())
        .and_then(|caps| caps.name("code"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| BookError::invalid_link(link))
}

/// Turns the CLI's `--link` / `--content` pair into a catalogue identity.
///
/// Exactly one of the two must be given. No network access happens here.
///
/// # Errors
///
/// - [`BookError::ConflictingArguments`] when both are given
/// - [`BookError::MissingArgument`] when neither is given
/// - [`BookError::InvalidLink`] when the input is malformed
pub fn resolve_identity(
    link: Option<&str>,
    content: Option<&str>,
    site_root: &Url,
) -> Result<CatalogueIdentity, BookError> {
    let code = match (link, content) {
        (Some(_), Some(_)) => return Err(BookError::ConflictingArguments),
        (None, None) => return Err(BookError::MissingArgument),
        (Some(link), None) => parse_link(link)?,
        (None, Some(code)) => code.trim().to_string(),
    };
    CatalogueIdentity::new(&code, site_root)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity(code: &str) -> CatalogueIdentity {
        CatalogueIdentity::new(code, &default_site_root()).unwrap()
    }

    #[test]
    fn test_parse_link_accepts_known_shapes() {
        let cases = [
            "http://springerlink.com/content/978-3-540-37345-9/",
            "https://www.springerlink.com/content/978-3-540-37345-9",
            "springerlink.de/content/978-3-540-37345-9/?p=abc&pi=0",
            "http://www.springer.com/computer/book/978-3-540-37345-9",
            "http://springer.de/content/978-3-540-37345-9",
        ];
        for link in cases {
            assert_eq!(parse_link(link).unwrap(), "978-3-540-37345-9", "{link}");
        }
    }

    #[test]
    fn test_parse_link_rejects_malformed_input() {
        let cases = [
            "http://springerlink.com/content/ABC123/",
            "http://springerlink.com/content/abc_123/",
            "http://example.com/content/abc123/",
            "http://springerlink.org/content/abc123/",
            "http://springerlink.com/journal/abc123/",
            "",
        ];
        for link in cases {
            assert!(
                matches!(parse_link(link), Err(BookError::InvalidLink { .. })),
                "{link} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_identity_builds_base_url_with_single_trailing_slash() {
        let root = default_site_root();
        let id = resolve_identity(
            Some("http://springerlink.com/content/ab12-cd/?MUD=MP"),
            None,
            &root,
        )
        .unwrap();
        assert_eq!(id.code(), "ab12-cd");
        assert_eq!(id.base_url().as_str(), "http://springerlink.com/content/ab12-cd/");
        assert!(!id.base_url().as_str().ends_with("//"));

        let id = resolve_identity(None, Some("ab12-cd"), &root).unwrap();
        assert_eq!(id.base_url().as_str(), "http://springerlink.com/content/ab12-cd/");
    }

    #[test]
    fn test_resolve_identity_argument_errors() {
        let root = default_site_root();
        assert!(matches!(
            resolve_identity(Some("x"), Some("y"), &root),
            Err(BookError::ConflictingArguments)
        ));
        assert!(matches!(
            resolve_identity(None, None, &root),
            Err(BookError::MissingArgument)
        ));
        assert!(matches!(
            resolve_identity(None, Some("Bad/Code"), &root),
            Err(BookError::InvalidLink { .. })
        ));
    }

    #[test]
    fn test_contents_url() {
        assert_eq!(
            identity("abc").contents_url().as_str(),
            "http://springerlink.com/content/abc/contents/"
        );
    }

    #[test]
    fn test_site_root_override_keeps_port() {
        let root = Url::parse("http://127.0.0.1:8080/ignored/path").unwrap();
        let id = CatalogueIdentity::new("abc", &root).unwrap();
        assert_eq!(id.base_url().as_str(), "http://127.0.0.1:8080/content/abc/");
        assert_eq!(id.site_root().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_resolve_href_variants() {
        let id = identity("abc");
        assert_eq!(
            id.resolve_href("fulltext.pdf").unwrap().as_str(),
            "http://springerlink.com/content/abc/fulltext.pdf"
        );
        assert_eq!(
            id.resolve_href("/content/xyz/fulltext.pdf").unwrap().as_str(),
            "http://springerlink.com/content/xyz/fulltext.pdf"
        );
        assert_eq!(
            id.resolve_href("../q1w2e3/fulltext.pdf").unwrap().as_str(),
            "http://springerlink.com/content/q1w2e3/fulltext.pdf"
        );
        assert_eq!(
            id.resolve_href("http://static.example.org/a.pdf").unwrap().as_str(),
            "http://static.example.org/a.pdf"
        );
    }

    #[test]
    fn test_collapse_parent_segments_repeats() {
        assert_eq!(
            collapse_parent_segments("http://h/content/a/b/../../c.pdf"),
            "http://h/content/c.pdf"
        );
        assert_eq!(collapse_parent_segments("http://h/x.pdf"), "http://h/x.pdf");
    }

    #[test]
    fn test_same_origin() {
        let id = identity("abc");
        assert!(id.is_same_origin(&Url::parse("http://springerlink.com/a.pdf").unwrap()));
        assert!(!id.is_same_origin(&Url::parse("http://other.org/a.pdf").unwrap()));
    }
}
