//! Book title to file name.
//!
//! Character transliteration is delegated to a [`Transliterator`]; the
//! production one pipes the title through `iconv -t ASCII//TRANSLIT`. This
//! module owns the separator and whitespace rules and the emptiness check.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::BookError;

/// Converts UTF-8 text to its closest ASCII rendering.
#[async_trait]
pub trait Transliterator: Send + Sync {
    /// Transliterates `text`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::ExternalTool`] when the conversion fails.
    async fn to_ascii(&self, text: &str) -> Result<String, BookError>;
}

/// [`Transliterator`] backed by the `iconv` program.
#[derive(Debug, Clone)]
pub struct IconvTransliterator {
    program: PathBuf,
}

impl IconvTransliterator {
    /// Program name looked up on `PATH`.
    pub const PROGRAM: &'static str = "iconv";

    /// Uses the `iconv` binary at `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the binary in use.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Transliterator for IconvTransliterator {
    #[instrument(level = "debug", skip(self))]
    async fn to_ascii(&self, text: &str) -> Result<String, BookError> {
        let mut child = Command::new(&self.program)
            .args(["-f", "UTF-8", "-t", "ASCII//TRANSLIT"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BookError::external_tool(Self::PROGRAM, e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| BookError::external_tool(Self::PROGRAM, e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| BookError::external_tool(Self::PROGRAM, e.to_string()))?;
        if !output.status.success() {
            return Err(BookError::external_tool(
                Self::PROGRAM,
                format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Applies the file name rules to already-transliterated text.
///
/// Trims, replaces `/` with `-`, collapses whitespace runs to `_` and drops
/// anything that is still not printable ASCII.
#[must_use]
pub fn normalize_file_stem(ascii: &str) -> String {
    ascii
        .trim()
        .replace('/', "-")
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_graphic())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Produces a file-system-safe base name for `title`.
///
/// # Errors
///
/// - [`BookError::Sanitization`] when nothing usable remains
/// - whatever the transliterator returns
pub async fn sanitize_title(
    title: &str,
    transliterator: &dyn Transliterator,
) -> Result<String, BookError> {
    let ascii = transliterator.to_ascii(title).await?;
    let stem = normalize_file_stem(&ascii);
    debug!(%title, %stem, "sanitized title");
    if stem.is_empty() {
        return Err(BookError::Sanitization {
            title: title.to_string(),
        });
    }
    Ok(stem)
}
