//! Top-level command implementations.
//!
//! reelcat has exactly two modes, chosen by `--report-sizes`:
//! - `archive_command` scans, plans and runs the transcode/concatenate pipeline
//! - `sizes_report_command` probes inputs with ffprobe and prints a size histogram

pub mod archive_command;
pub mod sizes_report_command;
