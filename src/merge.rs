//! Assembly of downloaded artifacts into the final document.
//!
//! Concatenation and cover conversion are external programs reached through
//! the [`DocumentMerger`] and [`ImageConverter`] capabilities. A single
//! artifact is moved into place without invoking any tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::error::BookError;

/// Concatenates PDF files in order.
#[async_trait]
pub trait DocumentMerger: Send + Sync {
    /// Tool name for log lines.
    fn name(&self) -> &str;

    /// Writes `inputs`, in order, as one document at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::ExternalTool`] when the merge fails.
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), BookError>;
}

/// Converts a raster image into a one-page PDF.
#[async_trait]
pub trait ImageConverter: Send + Sync {
    /// Converts `image` and returns the path of the new PDF.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::ExternalTool`] when the conversion fails.
    async fn to_pdf(&self, image: &Path) -> Result<PathBuf, BookError>;
}

/// Supported concatenation programs, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfTool {
    /// `pdftk <inputs> cat output <output>`
    Pdftk,
    /// `stapler cat <inputs> <output>`
    Stapler,
}

impl PdfTool {
    /// Preference order used during discovery.
    pub const ALL: [PdfTool; 2] = [PdfTool::Pdftk, PdfTool::Stapler];

    /// Program name looked up on `PATH`.
    #[must_use]
    pub fn program_name(self) -> &'static str {
        match self {
            Self::Pdftk => "pdftk",
            Self::Stapler => "stapler",
        }
    }
}

/// [`DocumentMerger`] that shells out to `pdftk` or `stapler`.
#[derive(Debug, Clone)]
pub struct ExternalPdfMerger {
    tool: PdfTool,
    program: PathBuf,
}

impl ExternalPdfMerger {
    /// Uses `tool` installed at `program`.
    #[must_use]
    pub fn new(tool: PdfTool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
        }
    }

    /// The selected tool.
    #[must_use]
    pub fn tool(&self) -> PdfTool {
        self.tool
    }

    /// Command-line arguments for merging `inputs` into `output`.
    #[must_use]
    pub fn arguments(&self, inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
        let inputs = inputs.iter().map(|p| p.as_os_str().to_owned());
        match self.tool {
            PdfTool::Pdftk => inputs
                .chain(["cat".into(), "output".into(), output.as_os_str().to_owned()])
                .collect(),
            PdfTool::Stapler => std::iter::once(OsString::from("cat"))
                .chain(inputs)
                .chain(std::iter::once(output.as_os_str().to_owned()))
                .collect(),
        }
    }
}

#[async_trait]
impl DocumentMerger for ExternalPdfMerger {
    fn name(&self) -> &str {
        self.tool.program_name()
    }

    #[instrument(skip(self, inputs), fields(tool = self.name(), count = inputs.len()))]
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), BookError> {
        run_tool(self.name(), &self.program, self.arguments(inputs, output)).await
    }
}

/// [`ImageConverter`] backed by ImageMagick's `convert`.
#[derive(Debug, Clone)]
pub struct ImageMagickConverter {
    program: PathBuf,
}

impl ImageMagickConverter {
    /// Program name looked up on `PATH`.
    pub const PROGRAM: &'static str = "convert";

    /// Uses the `convert` binary at `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ImageConverter for ImageMagickConverter {
    async fn to_pdf(&self, image: &Path) -> Result<PathBuf, BookError> {
        let output = pdf_sibling(image);
        run_tool(
            Self::PROGRAM,
            &self.program,
            vec![image.as_os_str().to_owned(), output.as_os_str().to_owned()],
        )
        .await?;
        Ok(output)
    }
}

/// `frontcover` -> `frontcover.pdf`, keeping any existing extension.
#[must_use]
pub fn pdf_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".pdf");
    PathBuf::from(name)
}

async fn run_tool(tool: &str, program: &Path, args: Vec<OsString>) -> Result<(), BookError> {
    debug!(tool, program = %program.display(), ?args, "running external tool");
    let output = Command::new(program)
        .args(&args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| BookError::external_tool(tool, e.to_string()))?;
    if output.status.success() {
        return Ok(());
    }
    Err(BookError::external_tool(
        tool,
        format!(
            "{}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    ))
}

/// Fails if `destination` is already present.
///
/// # Errors
///
/// [`BookError::OutputAlreadyExists`].
pub fn ensure_destination_free(destination: &Path) -> Result<(), BookError> {
    if destination.exists() {
        return Err(BookError::OutputAlreadyExists {
            path: destination.to_path_buf(),
        });
    }
    Ok(())
}

/// Produces the final document at `destination` from `inputs`, in order.
///
/// # Errors
///
/// - [`BookError::NoChaptersFound`] for an empty list
/// - [`BookError::Io`] if relocating a single artifact fails
/// - [`BookError::ExternalTool`] if the merger fails or writes nothing
pub async fn assemble(
    merger: &dyn DocumentMerger,
    inputs: &[PathBuf],
    destination: &Path,
) -> Result<(), BookError> {
    match inputs {
        [] => Err(BookError::NoChaptersFound),
        [single] => {
            info!(destination = %destination.display(), "single artifact; moving into place");
            relocate(single, destination).await
        }
        many => {
            info!(
                count = many.len(),
                tool = merger.name(),
                destination = %destination.display(),
                "merging chapters"
            );
            let result = match merger.concatenate(many, destination).await {
                Ok(()) if !destination.exists() => Err(BookError::external_tool(
                    merger.name(),
                    format!("no output written to {}", destination.display()),
                )),
                other => other,
            };
            if result.is_err() {
                discard_partial_output(destination).await;
            }
            result
        }
    }
}

/// Removes whatever a failed merge left at `destination`.
async fn discard_partial_output(destination: &Path) {
    match tokio::fs::remove_file(destination).await {
        Ok(()) => debug!(path = %destination.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => {
            warn!(path = %destination.display(), %error, "could not remove partial output");
        }
    }
}

/// Moves `from` to `to`, copying when they sit on different file systems.
async fn relocate(from: &Path, to: &Path) -> Result<(), BookError> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| BookError::io(to, e))?;
    tokio::fs::remove_file(from)
        .await
        .map_err(|e| BookError::io(from, e))
}
