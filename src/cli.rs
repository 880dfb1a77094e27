//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use springer_download::download::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, READ_TIMEOUT_SECS,
};
use springer_download::link::DEFAULT_SITE_ROOT;

/// Download a book from SpringerLink as a single PDF.
///
/// Pass either the book's link or its content code. Chapters are fetched in
/// reading order and merged with pdftk (or stapler) into `<title>.pdf`.
#[derive(Parser, Debug)]
#[command(name = "springer-download")]
#[command(author, version, about)]
pub struct Args {
    /// SpringerLink book link, e.g. http://springerlink.com/content/978-3-540-37345-9/
    #[arg(short = 'l', long)]
    pub link: Option<String>,

    /// Content code of the book, e.g. 978-3-540-37345-9
    #[arg(short = 'c', long)]
    pub content: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Retries for transient network failures (0-10, 0 makes every failure fatal)
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: u64,

    /// Directory the merged PDF is written to (default: current directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Do not prepend the cover image
    #[arg(long)]
    pub no_cover: bool,

    /// Catalogue site root
    #[arg(long, default_value = DEFAULT_SITE_ROOT, hide = true)]
    pub site_root: String,
}
