//! Constants for the download module (timeouts, retries, media type).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large chapters).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default retries after the first attempt. Zero keeps every failure fatal.
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// The only content type accepted for chapter artifacts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
