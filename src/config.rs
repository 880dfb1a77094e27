//! Settings for one run, resolved from the command line.
//!
//! The catalogue site root is not part of this; it is carried by the
//! [`CatalogueIdentity`](crate::link::CatalogueIdentity).

use std::path::PathBuf;

use crate::download::HttpSettings;

/// Everything the pipeline needs to know besides the catalogue identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory the final PDF is written to.
    pub output_dir: PathBuf,
    /// Parent of the scratch workspace; the system temp dir when `None`.
    pub scratch_parent: Option<PathBuf>,
    /// Timeouts and retries.
    pub http: HttpSettings,
    /// Download and prepend the cover image when the page has one.
    pub include_cover: bool,
    /// Draw per-artifact progress lines.
    pub interactive: bool,
}

impl RunConfig {
    /// Defaults with the final PDF going to `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            scratch_parent: None,
            http: HttpSettings::default(),
            include_cover: true,
            interactive: false,
        }
    }

    /// Places the scratch workspace under `parent`.
    #[must_use]
    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    /// Overrides transport settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    /// Enables or disables the cover image.
    #[must_use]
    pub fn with_cover(mut self, include_cover: bool) -> Self {
        self.include_cover = include_cover;
        self
    }

    /// Enables or disables progress lines.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("/books");
        assert_eq!(config.output_dir, PathBuf::from("/books"));
        assert!(config.scratch_parent.is_none());
        assert!(config.include_cover);
        assert!(!config.interactive);
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn test_builders() {
        let config = RunConfig::new(".")
            .with_cover(false)
            .with_interactive(true)
            .with_scratch_parent("/scratch");
        assert!(!config.include_cover);
        assert!(config.interactive);
        assert_eq!(config.scratch_parent, Some(PathBuf::from("/scratch")));
    }
}
