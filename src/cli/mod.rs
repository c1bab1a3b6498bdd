//! Command-line interface for the reelcat transcoding tool.
//!
//! Unlike a subcommand-based CLI, reelcat does one thing: it plans and runs
//! the transcode/concatenate pipeline over the given directories. The flags
//! below are a flat argument surface rather than a `Commands` enum.

pub mod ui;

use std::path::PathBuf;

use clap::Parser;

pub use ui::{print_error, print_success, print_warning};

/// Transcode and concatenate directories of video files.
#[derive(Parser, Debug)]
#[command(name = "reelcat")]
#[command(about = "Plans and runs a bounded-parallel transcode + concatenate pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Be verbose.
    #[arg(long)]
    pub verbose: bool,

    /// Don't affect anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Do not parallelise tasks.
    #[arg(long = "single-thread")]
    pub single_thread: bool,

    /// Maximum number of tasks to have running at any one time.
    #[arg(long = "max-parallel-tasks", default_value_t = 4)]
    pub max_parallel_tasks: usize,

    /// Use de-interlacing.
    #[arg(long)]
    pub decomb: bool,

    /// Fix dodgy audio (mystery audio stream on some older files).
    #[arg(long = "fix-audio")]
    pub fix_audio: bool,

    /// Encode quality. Smaller numbers are better quality, but slower to encode.
    #[arg(long, default_value_t = 20)]
    pub quality: u32,

    /// Location for output files.
    #[arg(long = "output-root", default_value = "out")]
    pub output_root: PathBuf,

    /// Location for log output. Default is standard output.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Pixel width of output files. Default is "do not adjust".
    #[arg(long)]
    pub width: Option<u32>,

    /// Pixel height of output files. Default is "do not adjust".
    #[arg(long)]
    pub height: Option<u32>,

    /// Probe video dimensions and print a histogram instead of transcoding.
    #[arg(long = "report-sizes")]
    pub report_sizes: bool,

    /// Input directories to process.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Parse arguments, validate them into [`crate::config::Settings`], and run.
pub async fn run() -> crate::Result<()> {
    let cli = Cli::parse();
    let settings = crate::config::Settings::from_cli(cli)?;

    crate::logging::init(&settings)?;

    if settings.verbose {
        log::info!("Settings: {settings:?}");
    }
    if settings.dry_run {
        log::info!("Dry run mode enabled");
    }

    if settings.report_sizes {
        crate::commands::sizes_report_command::execute(&settings).await
    } else {
        crate::commands::archive_command::execute(&settings).await
    }
}
