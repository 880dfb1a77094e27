//! One run: crawl, download, merge, clean up.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::catalogue::CatalogueCrawler;
use crate::config::RunConfig;
use crate::download::{ArtifactDownloader, HttpClient};
use crate::error::BookError;
use crate::link::CatalogueIdentity;
use crate::merge::{DocumentMerger, ImageConverter, assemble, ensure_destination_free};
use crate::sanitize::{Transliterator, sanitize_title};
use crate::tools::ToolSet;
use crate::workspace::Workspace;

/// External capabilities used by a run.
#[derive(Clone, Copy)]
pub struct Toolbox<'a> {
    /// PDF concatenation.
    pub merger: &'a dyn DocumentMerger,
    /// Title transliteration.
    pub transliterator: &'a dyn Transliterator,
    /// Cover conversion; the cover is skipped when absent.
    pub image_converter: Option<&'a dyn ImageConverter>,
}

impl<'a> Toolbox<'a> {
    /// Borrows the discovered production tools.
    #[must_use]
    pub fn from_tool_set(tools: &'a ToolSet) -> Self {
        Self {
            merger: &tools.merger,
            transliterator: &tools.transliterator,
            image_converter: tools
                .image_converter
                .as_ref()
                .map(|c| c as &dyn ImageConverter),
        }
    }
}

impl std::fmt::Debug for Toolbox<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolbox")
            .field("merger", &self.merger.name())
            .field("image_converter", &self.image_converter.is_some())
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Book title.
    pub title: String,
    /// Where the merged PDF was written.
    pub output_path: PathBuf,
    /// Chapters downloaded (cover excluded).
    pub chapter_count: usize,
    /// Size of the merged PDF.
    pub bytes: u64,
}

/// Downloads the book behind `identity` and writes it to `config.output_dir`.
///
/// The destination is checked as soon as the first page yields the title,
/// before any chapter is downloaded. The scratch workspace exists before
/// the first request and is removed on every return path.
///
/// # Errors
///
/// Any [`BookError`]; every error aborts the run.
#[instrument(skip_all, fields(code = %identity.code()))]
pub async fn run(
    identity: &CatalogueIdentity,
    config: &RunConfig,
    tools: Toolbox<'_>,
) -> Result<RunSummary, BookError> {
    let client =
        HttpClient::new(&config.http).map_err(|source| BookError::ClientSetup { source })?;

    let workspace = match &config.scratch_parent {
        Some(parent) => Workspace::create_in(parent)?,
        None => Workspace::create()?,
    };

    let crawler = CatalogueCrawler::new(&client, identity);
    let mut state = crawler.start();
    let mut output_path = None;
    while crawler.crawl_next(&mut state).await? {
        if output_path.is_none()
            && let Some(title) = state.metadata().title()
        {
            let path = destination_for(title, &config.output_dir, tools.transliterator).await?;
            info!(%title, "Now trying to download book '{title}'");
            output_path = Some(path);
        }
    }
    let book = crawler.finish(state)?;
    let output_path = output_path.ok_or_else(|| BookError::TitleExtraction {
        url: identity.contents_url().to_string(),
    })?;

    let downloader =
        ArtifactDownloader::new(&client, identity, workspace.path(), config.interactive);

    let total = book.chapters.len();
    let mut files = Vec::with_capacity(total + 1);
    for (index, chapter) in book.chapters.iter().enumerate() {
        let position = index + 1;
        info!(position, total, "downloading chapter {position}/{total}");
        let record = downloader
            .download_chapter(chapter, position, &book.title)
            .await?;
        files.push(record.local_path);
    }

    if config.include_cover
        && let Some(cover_url) = &book.cover_url
        && let Some(cover) = fetch_cover(&downloader, tools.image_converter, cover_url).await
    {
        files.insert(0, cover);
    }

    assemble(tools.merger, &files, &output_path).await?;
    workspace.close()?;

    let bytes = tokio::fs::metadata(&output_path)
        .await
        .map_err(|e| BookError::io(&output_path, e))?
        .len();

    Ok(RunSummary {
        title: book.title,
        output_path,
        chapter_count: total,
        bytes,
    })
}

/// `<output_dir>/<sanitized title>.pdf`, provided it does not exist yet.
async fn destination_for(
    title: &str,
    output_dir: &Path,
    transliterator: &dyn Transliterator,
) -> Result<PathBuf, BookError> {
    let stem = sanitize_title(title, transliterator).await?;
    let path = output_dir.join(format!("{stem}.pdf"));
    ensure_destination_free(&path)?;
    Ok(path)
}

/// Downloads and converts the cover. Any failure just leaves the cover out.
async fn fetch_cover(
    downloader: &ArtifactDownloader<'_>,
    converter: Option<&dyn ImageConverter>,
    url: &Url,
) -> Option<PathBuf> {
    let Some(converter) = converter else {
        debug!("no image converter; skipping cover");
        return None;
    };

    info!(url = %url, "downloading front cover");
    let record = match downloader.download(url, "frontcover").await {
        Ok(record) => record,
        Err(error) => {
            warn!(%error, "cover download failed; continuing without cover");
            return None;
        }
    };

    match converter.to_pdf(&record.local_path).await {
        Ok(pdf) => Some(pdf),
        Err(error) => {
            warn!(%error, "cover conversion failed; continuing without cover");
            None
        }
    }
}
