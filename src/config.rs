//! Immutable run settings derived from parsed CLI arguments.
//!
//! The CLI layer only knows how to parse flags; this module turns them into
//! a validated, immutable value that is threaded into the Planner, Scheduler
//! and Executor rather than read from a global.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::ReelcatError;

/// Estimator seed: FixAudio is a demux/remux, mostly a stream copy bottlenecked on disk.
///
/// Derived from a long encoding session observed on the reference hardware.
pub const SEED_FIX_AUDIO_BYTES_PER_SECOND: f64 = 30.6 * 1_000.0 * 1_000.0;

/// Estimator seed: Transcode is CPU-bound two-pass software H.265 encoding.
pub const SEED_TRANSCODE_BYTES_PER_SECOND: f64 = 100.0 * 1_000.0;

/// Estimator seed: Concatenate is a stream-copy, typically the fastest phase.
///
/// The reference implementation left this at zero, which meant the very
/// first aggregate forecast of a run was dominated by an un-costed phase.
pub const SEED_CONCATENATE_BYTES_PER_SECOND: f64 = 200.0 * 1_000.0 * 1_000.0;

/// Validated, immutable settings for a single run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input directories, in command-line order.
    pub paths: Vec<PathBuf>,
    /// Be verbose in logging.
    pub verbose: bool,
    /// Don't touch the filesystem or spawn external processes.
    pub dry_run: bool,
    /// Maximum number of tasks running at any one time.
    pub max_parallel_tasks: usize,
    /// Apply de-interlacing during transcode.
    pub decomb: bool,
    /// Insert a FixAudio pass ahead of each Transcode.
    pub fix_audio: bool,
    /// Encode quality passed to the transcoder (lower is better/slower).
    pub quality: u32,
    /// Directory for final concatenated outputs.
    pub output_root: PathBuf,
    /// Destination for log output; `None` means standard output.
    pub log: Option<PathBuf>,
    /// Optional output pixel width override.
    pub width: Option<u32>,
    /// Optional output pixel height override.
    pub height: Option<u32>,
    /// Run the sizes-report audit instead of transcoding.
    pub report_sizes: bool,
}

impl Settings {
    /// Validate and convert parsed CLI arguments into a [`Settings`] value.
    pub fn from_cli(cli: Cli) -> Result<Self, ReelcatError> {
        if cli.paths.is_empty() {
            return Err(ReelcatError::config("at least one input directory is required"));
        }

        let mut max_parallel_tasks = cli.max_parallel_tasks;
        if cli.single_thread {
            max_parallel_tasks = 1;
        }
        if max_parallel_tasks < 1 {
            return Err(ReelcatError::config("--max-parallel-tasks must be 1 or more"));
        }

        Ok(Settings {
            paths: cli.paths,
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            max_parallel_tasks,
            decomb: cli.decomb,
            fix_audio: cli.fix_audio,
            quality: cli.quality,
            output_root: cli.output_root,
            log: cli.log,
            width: cli.width,
            height: cli.height,
            report_sizes: cli.report_sizes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn cli_with(args: &[&str]) -> Cli {
        let mut full = vec!["reelcat"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_rejects_zero_paths() {
        let cli = cli_with(&[]);
        assert!(Settings::from_cli(cli).is_err());
    }

    #[test]
    fn test_single_thread_forces_one_worker() {
        let cli = cli_with(&["--single-thread", "--max-parallel-tasks", "8", "videos"]);
        let settings = Settings::from_cli(cli).unwrap();
        assert_eq!(settings.max_parallel_tasks, 1);
    }

    #[test]
    fn test_rejects_zero_max_parallel_tasks() {
        let cli = cli_with(&["--max-parallel-tasks", "0", "videos"]);
        assert!(Settings::from_cli(cli).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = cli_with(&["videos"]);
        let settings = Settings::from_cli(cli).unwrap();
        assert_eq!(settings.max_parallel_tasks, 4);
        assert_eq!(settings.quality, 20);
        assert_eq!(settings.output_root, PathBuf::from("out"));
        assert!(!settings.fix_audio);
        assert!(!settings.decomb);
    }
}
