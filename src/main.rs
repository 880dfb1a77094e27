//! CLI entry point for springer-download.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use springer_download::download::progress::stdout_is_interactive;
use springer_download::{
    BookError, HttpSettings, RunConfig, RunLog, RunSummary, ToolSet, Toolbox, pipeline,
    resolve_identity,
};
use tokio::signal;
use tracing::{debug, warn};
use url::Url;

mod cli;

use cli::Args;

/// Exit status for every failed run.
const FAILURE_EXIT_CODE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);
    debug!(?args, "CLI arguments parsed");

    let invocation_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let run_log = RunLog::in_dir(&invocation_dir);

    match execute(&args, &invocation_dir).await {
        Ok(summary) => {
            println!(
                "book {} was successfully downloaded, it was saved to {}",
                summary.title,
                summary.output_path.display()
            );
            run_log.record_success(summary.chapter_count, summary.bytes, &summary.title);
            ExitCode::SUCCESS
        }
        Err(error) => {
            if error
                .downcast_ref::<BookError>()
                .is_some_and(BookError::is_usage_error)
            {
                let _ = Args::command().write_help(&mut io::stderr());
                eprintln!();
            }
            eprintln!("ERROR: {error}");
            run_log.record_failure(&error.to_string());
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info).
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init();
}

async fn execute(args: &Args, invocation_dir: &Path) -> Result<RunSummary> {
    let site_root =
        Url::parse(&args.site_root).map_err(|_| BookError::invalid_link(&args.site_root))?;
    let identity = resolve_identity(args.link.as_deref(), args.content.as_deref(), &site_root)?;
    debug!(code = identity.code(), base = %identity.base_url(), "resolved catalogue entry");

    let tools = ToolSet::discover()?;

    let config = RunConfig::new(
        args.output_dir
            .clone()
            .unwrap_or_else(|| invocation_dir.to_path_buf()),
    )
    .with_http(HttpSettings {
        connect_timeout: Duration::from_secs(args.connect_timeout),
        read_timeout: Duration::from_secs(args.read_timeout),
        max_retries: u32::from(args.max_retries),
    })
    .with_cover(!args.no_cover)
    .with_interactive(!args.quiet && stdout_is_interactive());

    // Dropping the run future on Ctrl-C drops its workspace too.
    tokio::select! {
        result = pipeline::run(&identity, &config, Toolbox::from_tool_set(&tools)) => Ok(result?),
        _ = signal::ctrl_c() => {
            warn!("interrupted; removing downloaded chapters");
            Err(anyhow!("interrupted"))
        }
    }
}
