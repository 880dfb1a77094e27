//! Chapter and cover artifact downloads into the scratch workspace.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use url::Url;

use super::client::HttpClient;
use super::constants::PDF_MEDIA_TYPE;
use super::progress::artifact_progress;
use crate::catalogue::ChapterLink;
use crate::error::BookError;
use crate::link::CatalogueIdentity;

/// A downloaded artifact and what the server said it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// File in the scratch workspace.
    pub local_path: PathBuf,
    /// Raw `Content-Type` header, if any.
    pub declared_content_type: Option<String>,
    /// Size on disk.
    pub bytes: u64,
}

impl ArtifactRecord {
    /// Lower-cased media type without parameters, e.g. `application/pdf`.
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.declared_content_type.as_deref().map(media_type_essence)
    }

    /// True when the server declared a PDF.
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.media_type().as_deref() == Some(PDF_MEDIA_TYPE)
    }
}

/// Strips parameters and case from a `Content-Type` value.
#[must_use]
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Downloads artifacts of one catalogue entry into a scratch directory.
#[derive(Debug)]
pub struct ArtifactDownloader<'a> {
    client: &'a HttpClient,
    identity: &'a CatalogueIdentity,
    scratch_dir: &'a Path,
    interactive: bool,
}

impl<'a> ArtifactDownloader<'a> {
    /// Creates a downloader writing into `scratch_dir`.
    #[must_use]
    pub fn new(
        client: &'a HttpClient,
        identity: &'a CatalogueIdentity,
        scratch_dir: &'a Path,
        interactive: bool,
    ) -> Self {
        Self {
            client,
            identity,
            scratch_dir,
            interactive,
        }
    }

    /// Downloads chapter `position` (1-based) to `<position>.pdf` and checks it is a PDF.
    ///
    /// # Errors
    ///
    /// - [`BookError::Fetch`] on transport failure
    /// - [`BookError::InvalidContentType`] when the server declares anything
    ///   but `application/pdf`; `title` is named in the message
    #[instrument(skip(self, link, title), fields(href = %link.href()))]
    pub async fn download_chapter(
        &self,
        link: &ChapterLink,
        position: usize,
        title: &str,
    ) -> Result<ArtifactRecord, BookError> {
        let url = self.identity.resolve_href(link.href())?;
        let record = self.download(&url, &format!("{position}.pdf")).await?;
        if !record.is_pdf() {
            return Err(BookError::InvalidContentType {
                url: url.to_string(),
                content_type: record
                    .media_type()
                    .unwrap_or_else(|| "unknown".to_string()),
                title: title.to_string(),
            });
        }
        Ok(record)
    }

    /// Downloads `url` to `file_name` inside the scratch directory, without type checks.
    ///
    /// # Errors
    ///
    /// [`BookError::Fetch`] on transport failure.
    pub async fn download(&self, url: &Url, file_name: &str) -> Result<ArtifactRecord, BookError> {
        let destination = self.scratch_dir.join(file_name);
        let progress = artifact_progress(url.as_str(), self.interactive);
        let result = self
            .client
            .download_to_path(url, &destination, &progress)
            .await;
        progress.finish();
        let file = result.map_err(|e| BookError::fetch(url.as_str(), e))?;

        info!(path = %file.path.display(), bytes = file.bytes, "artifact saved");
        Ok(ArtifactRecord {
            local_path: file.path,
            declared_content_type: file.content_type,
            bytes: file.bytes,
        })
    }
}
