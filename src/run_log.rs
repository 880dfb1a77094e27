//! Append-only run log in the invoking directory.
//!
//! One line per finished run. Failing to write the log never fails the run;
//! the problem is reported through `tracing` instead.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

/// File name of the run log.
pub const LOG_FILE_NAME: &str = "springer_download.log";

const MIB: f64 = 1024.0 * 1024.0;

/// Handle on the run log file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Log file inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(LOG_FILE_NAME),
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a completed download.
    pub fn record_success(&self, chapters: usize, bytes: u64, title: &str) {
        self.append(&success_line(chapters, bytes, title));
    }

    /// Records a fatal error.
    pub fn record_failure(&self, message: &str) {
        self.append(&format!("ERR: {message}"));
    }

    fn append(&self, line: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(error) = result {
            warn!(path = %self.path.display(), %error, "could not write run log");
        }
    }
}

/// `downloaded 12 chapters (3.40MiB) of Title`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn success_line(chapters: usize, bytes: u64, title: &str) -> String {
    format!(
        "downloaded {chapters} chapters ({:.2}MiB) of {title}",
        bytes as f64 / MIB
    )
}
