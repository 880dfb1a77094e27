//! Discovery of the external programs a run depends on.
//!
//! Runs before any network activity so a missing tool fails the run up
//! front rather than after every chapter has been downloaded.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::BookError;
use crate::merge::{ExternalPdfMerger, ImageMagickConverter, PdfTool};
use crate::sanitize::IconvTransliterator;

/// The production implementations of every external capability.
#[derive(Debug, Clone)]
pub struct ToolSet {
    /// `pdftk` or `stapler`.
    pub merger: ExternalPdfMerger,
    /// `iconv`.
    pub transliterator: IconvTransliterator,
    /// ImageMagick `convert`; the cover is skipped without it.
    pub image_converter: Option<ImageMagickConverter>,
}

impl ToolSet {
    /// Looks up every tool on `PATH`.
    ///
    /// # Errors
    ///
    /// [`BookError::MissingDependency`] when no PDF merger or no `iconv` is installed.
    pub fn discover() -> Result<Self, BookError> {
        Self::discover_with(|name| which::which(name).ok())
    }

    /// Discovery with a custom lookup, for tests.
    ///
    /// # Errors
    ///
    /// Same as [`discover`](Self::discover).
    pub fn discover_with(lookup: impl Fn(&str) -> Option<PathBuf>) -> Result<Self, BookError> {
        let merger = PdfTool::ALL
            .into_iter()
            .find_map(|tool| {
                lookup(tool.program_name()).map(|path| ExternalPdfMerger::new(tool, path))
            })
            .ok_or_else(|| {
                BookError::missing_dependency(
                    "You have to install pdftk (https://www.pdflabs.com/tools/pdftk-server/) or stapler (https://github.com/hellerbarde/stapler).",
                )
            })?;
        debug!(tool = merger.tool().program_name(), "selected PDF merger");

        let transliterator = lookup(IconvTransliterator::PROGRAM)
            .map(IconvTransliterator::new)
            .ok_or_else(|| BookError::missing_dependency("You have to install iconv."))?;

        let image_converter = lookup(ImageMagickConverter::PROGRAM).map(ImageMagickConverter::new);
        if image_converter.is_none() {
            warn!("ImageMagick 'convert' not found; the cover image will be skipped");
        }

        Ok(Self {
            merger,
            transliterator,
            image_converter,
        })
    }
}
