//! Run-level error taxonomy.
//!
//! Every variant is fatal to the run. The binary prints the message once,
//! prefixed with `ERROR:`, and exits with a non-zero status after the
//! scratch workspace has been dropped.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

/// Errors surfaced by the discovery-and-assembly pipeline.
#[derive(Debug, Error)]
pub enum BookError {
    /// Both a link and a content identifier were supplied.
    #[error("-c and -l arguments are mutually exclusive")]
    ConflictingArguments,

    /// Neither a link nor a content identifier was supplied.
    #[error("either a link or a content identifier must be given")]
    MissingArgument,

    /// The input does not match the catalogue URL shape.
    #[error("bad link given: '{input}' does not look like a SpringerLink book link")]
    InvalidLink {
        /// The rejected input.
        input: String,
    },

    /// A page or artifact could not be fetched.
    #[error("bad link given ({source})")]
    Fetch {
        /// The URL being fetched.
        url: String,
        /// The transport failure.
        #[source]
        source: DownloadError,
    },

    /// The site explicitly denied access to a catalogue page.
    #[error("could not access page {url}: 403 Forbidden")]
    AccessDenied {
        /// The denied page.
        url: String,
    },

    /// The first catalogue page had no usable title heading.
    #[error("could not evaluate book title - bad link {url}")]
    TitleExtraction {
        /// The page that was inspected.
        url: String,
    },

    /// The crawl finished without discovering a single chapter.
    #[error("no chapters found - bad link?")]
    NoChaptersFound,

    /// A chapter was served with something other than a PDF.
    #[error(
        "downloaded chapter {url} has invalid mime type {content_type} - are you allowed to download {title}?"
    )]
    InvalidContentType {
        /// The chapter URL.
        url: String,
        /// The declared content type (or `unknown`).
        content_type: String,
        /// The book title, for the entitlement hint.
        title: String,
    },

    /// The title transliterated to an empty file name.
    #[error("could not transliterate book title {title}")]
    Sanitization {
        /// The original title.
        title: String,
    },

    /// The destination file is already present.
    #[error("{} already downloaded", path.display())]
    OutputAlreadyExists {
        /// The existing destination.
        path: PathBuf,
    },

    /// A required external program is not on the search path.
    #[error("{message}")]
    MissingDependency {
        /// Installation hint naming the missing program(s).
        message: String,
    },

    /// An external program ran but failed.
    #[error("{tool} failed: {message}")]
    ExternalTool {
        /// Program name.
        tool: String,
        /// Exit status or stderr excerpt.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("could not set up the HTTP client: {source}")]
    ClientSetup {
        /// The builder failure.
        #[source]
        source: DownloadError,
    },

    /// Local file system failure outside the transport layer.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl BookError {
    /// Creates an invalid link error.
    pub fn invalid_link(input: impl Into<String>) -> Self {
        Self::InvalidLink {
            input: input.into(),
        }
    }

    /// Wraps a transport failure, promoting HTTP 403 to [`BookError::AccessDenied`].
    pub fn fetch(url: impl Into<String>, source: DownloadError) -> Self {
        let url = url.into();
        if source.status() == Some(403) {
            return Self::AccessDenied { url };
        }
        Self::Fetch { url, source }
    }

    /// Creates an external tool failure.
    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Creates a missing dependency error.
    pub fn missing_dependency(message: impl Into<String>) -> Self {
        Self::MissingDependency {
            message: message.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for argument errors that should be followed by usage text.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::ConflictingArguments | Self::MissingArgument | Self::InvalidLink { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_promotes_forbidden_to_access_denied() {
        let error = BookError::fetch(
            "http://springerlink.com/content/abc/contents/",
            DownloadError::http_status("http://springerlink.com/content/abc/contents/", 403),
        );
        assert!(matches!(error, BookError::AccessDenied { .. }));
    }

    #[test]
    fn test_fetch_keeps_other_statuses() {
        let error = BookError::fetch(
            "http://springerlink.com/content/abc/contents/",
            DownloadError::http_status("http://springerlink.com/content/abc/contents/", 404),
        );
        assert!(matches!(error, BookError::Fetch { .. }));
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn test_client_setup_is_not_reported_as_bad_link() {
        let error = BookError::ClientSetup {
            source: DownloadError::io(
                "/etc/ssl/certs",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no trust store"),
            ),
        };
        let message = error.to_string();
        assert!(message.starts_with("could not set up the HTTP client"), "{message}");
        assert!(!message.contains("bad link"));
        assert!(!error.is_usage_error());
    }

    #[test]
    fn test_usage_errors() {
        assert!(BookError::ConflictingArguments.is_usage_error());
        assert!(BookError::MissingArgument.is_usage_error());
        assert!(BookError::invalid_link("x").is_usage_error());
        assert!(!BookError::NoChaptersFound.is_usage_error());
    }

    #[test]
    fn test_output_exists_message_names_path() {
        let error = BookError::OutputAlreadyExists {
            path: PathBuf::from("/home/reader/Some_Book.pdf"),
        };
        assert_eq!(
            error.to_string(),
            "/home/reader/Some_Book.pdf already downloaded"
        );
    }
}
