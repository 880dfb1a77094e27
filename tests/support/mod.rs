//! Shared fixtures for the integration tests: catalogue page markup, a mock
//! catalogue server and in-memory stand-ins for the external tools.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use springer_download::merge::pdf_sibling;
use springer_download::{BookError, CatalogueIdentity, DocumentMerger, ImageConverter, Transliterator};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Content code used by every fixture.
pub const CODE: &str = "978-3-540-37345-9";

/// Builds a catalogue page the way the site lays it out.
pub fn catalogue_page(
    title: Option<&str>,
    cover_id: Option<&str>,
    hrefs: &[&str],
    next: Option<&str>,
) -> String {
    let mut html = String::from("<html><body>\n");
    if let Some(title) = title {
        html.push_str(&format!(r#"<h1 lang="en" class="title">{title}</h1>"#));
        html.push('\n');
    }
    if let Some(id) = cover_id {
        html.push_str(&format!(
            r#"<div class="coverImage" style="background-image: url(/content/{id}/cover-medium.gif)"></div>"#
        ));
        html.push('\n');
    }
    html.push_str("<ul>\n");
    for href in hrefs {
        html.push_str(&format!(r#"<li><a href="{href}">PDF</a></li>"#));
        html.push('\n');
    }
    html.push_str("</ul>\n");
    if let Some(next) = next {
        html.push_str(&format!(r#"<a href="{next}">Next</a>"#));
        html.push('\n');
    }
    html.push_str("</body></html>\n");
    html
}

/// Identity of [`CODE`] on the mock server.
pub fn identity_for(server: &MockServer) -> CatalogueIdentity {
    let root = Url::parse(&server.uri()).unwrap();
    CatalogueIdentity::new(CODE, &root).unwrap()
}

/// Path of a page below the entry, e.g. `contents/`.
pub fn entry_path(rest: &str) -> String {
    format!("/content/{CODE}/{rest}")
}

/// Serves `html` at `route`.
pub async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html.into_bytes(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Serves `body` as a PDF at `route`.
pub async fn mount_pdf(server: &MockServer, route: &str, body: &[u8]) {
    mount_artifact(server, route, "application/pdf", body).await;
}

/// Serves `body` with `content_type` at `route`.
pub async fn mount_artifact(server: &MockServer, route: &str, content_type: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_vec(), content_type),
        )
        .mount(server)
        .await;
}

/// Drops every non-ASCII character.
#[derive(Debug, Default)]
pub struct AsciiOnly;

#[async_trait]
impl Transliterator for AsciiOnly {
    async fn to_ascii(&self, text: &str) -> Result<String, BookError> {
        Ok(text.chars().filter(char::is_ascii).collect())
    }
}

/// Concatenates input bytes and remembers what it was asked to merge.
#[derive(Debug, Default)]
pub struct ConcatMerger {
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl ConcatMerger {
    /// Number of `concatenate` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Inputs of the most recent call.
    pub fn last_inputs(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl DocumentMerger for ConcatMerger {
    fn name(&self) -> &str {
        "concat"
    }

    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), BookError> {
        self.calls.lock().unwrap().push(inputs.to_vec());
        let mut merged = Vec::new();
        for input in inputs {
            merged.extend(tokio::fs::read(input).await.unwrap());
        }
        tokio::fs::write(output, merged).await.unwrap();
        Ok(())
    }
}

/// "Converts" an image by copying its bytes next to it with a `.pdf` suffix.
#[derive(Debug, Default)]
pub struct CopyConverter;

#[async_trait]
impl ImageConverter for CopyConverter {
    async fn to_pdf(&self, image: &Path) -> Result<PathBuf, BookError> {
        let output = pdf_sibling(image);
        tokio::fs::copy(image, &output).await.unwrap();
        Ok(output)
    }
}

/// Always fails, like `convert` exiting non-zero.
#[derive(Debug, Default)]
pub struct FailingConverter;

#[async_trait]
impl ImageConverter for FailingConverter {
    async fn to_pdf(&self, _image: &Path) -> Result<PathBuf, BookError> {
        Err(BookError::external_tool("convert", "unsupported image"))
    }
}

/// Writes a truncated document, then reports failure like a crashed `pdftk`.
#[derive(Debug, Default)]
pub struct TruncatingMerger;

#[async_trait]
impl DocumentMerger for TruncatingMerger {
    fn name(&self) -> &str {
        "pdftk"
    }

    async fn concatenate(&self, _inputs: &[PathBuf], output: &Path) -> Result<(), BookError> {
        tokio::fs::write(output, b"%PDF-1.4 trunc").await.unwrap();
        Err(BookError::external_tool("pdftk", "exit status: 1"))
    }
}
