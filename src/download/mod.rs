//! HTTP transport: page fetching, artifact downloads, retries, and progress.
//!
//! # Example
//!
//! ```no_run
//! use springer_download::download::{HttpClient, HttpSettings};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&HttpSettings::default())?;
//! let url = Url::parse("http://springerlink.com/content/abc/contents/")?;
//! let html = client.fetch_text(&url).await?;
//! println!("{} bytes", html.len());
//! # Ok(())
//! # }
//! ```

mod artifact;
mod client;
pub mod constants;
mod error;
pub mod progress;
mod retry;

pub use artifact::{ArtifactDownloader, ArtifactRecord, media_type_essence};
pub use client::{DownloadedFile, HttpClient, HttpSettings, PageFetcher};
pub use constants::PDF_MEDIA_TYPE;
pub use error::DownloadError;
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
