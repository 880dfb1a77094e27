//! Scratch directory owned by one run.
//!
//! The directory is created before the first artifact download and removed
//! when the [`Workspace`] is dropped, which covers early returns through `?`,
//! panics that unwind, and the run future being dropped on Ctrl-C. Artifact
//! paths are built under [`Workspace::path`]; the process working directory
//! is never changed.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::BookError;

const PREFIX: &str = "springer-download-";

/// A temporary directory removed on drop.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a workspace in the system temporary directory.
    ///
    /// # Errors
    ///
    /// [`BookError::Io`] if the directory cannot be created.
    pub fn create() -> Result<Self, BookError> {
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir()
            .map_err(|e| BookError::io(std::env::temp_dir(), e))?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    /// Creates a workspace under `parent`.
    ///
    /// # Errors
    ///
    /// [`BookError::Io`] if the directory cannot be created.
    pub fn create_in(parent: &Path) -> Result<Self, BookError> {
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(parent)
            .map_err(|e| BookError::io(parent, e))?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    /// The scratch directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for an artifact named `file_name` inside the workspace.
    #[must_use]
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    /// Removes the directory now, reporting failures instead of ignoring them.
    ///
    /// # Errors
    ///
    /// [`BookError::Io`] if removal fails.
    pub fn close(self) -> Result<(), BookError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| BookError::io(&path, e))?;
        debug!(path = %path.display(), "removed workspace");
        Ok(())
    }
}
