//! SpringerLink book downloader library.
//!
//! Turns a SpringerLink book link (or its bare content code) into a single
//! merged PDF: the paginated chapter listing is crawled, every chapter PDF is
//! downloaded into a scratch workspace, and the chapters are concatenated in
//! reading order with an external PDF tool.
//!
//! # Architecture
//!
//! - [`link`] - Input validation and the canonical [`CatalogueIdentity`]
//! - [`catalogue`] - Page parsing, crawling, front/back matter ordering
//! - [`download`] - HTTP client with retry, artifact downloads with a PDF guard
//! - [`sanitize`] - Title to file name conversion
//! - [`merge`] - PDF concatenation and cover conversion
//! - [`workspace`] - Scratch directory removed on every exit path
//! - [`tools`] - Discovery of the external binaries
//! - [`pipeline`] - One complete run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalogue;
pub mod config;
pub mod download;
pub mod error;
pub mod link;
pub mod merge;
pub mod pipeline;
pub mod run_log;
pub mod sanitize;
pub mod tools;
mod user_agent;
pub mod workspace;

// Re-export commonly used types
pub use catalogue::{Book, CatalogueCrawler, ChapterLink, ChapterRole, ChapterSet};
pub use config::RunConfig;
pub use download::{DownloadError, HttpClient, HttpSettings, PageFetcher};
pub use error::BookError;
pub use link::{CatalogueIdentity, resolve_identity};
pub use merge::{DocumentMerger, ImageConverter};
pub use pipeline::{RunSummary, Toolbox, run};
pub use run_log::RunLog;
pub use sanitize::{Transliterator, sanitize_title};
pub use tools::ToolSet;
pub use workspace::Workspace;
