//! Reads video dimensions out of `ffprobe`'s stderr banner.
//!
//! `ffprobe` doesn't offer a terse "just give me width/height" flag in the
//! form this tool relies on, so the sizes report falls back to scraping the
//! human-readable stream banner ffprobe prints instead of piping
//! `-show_streams` JSON through a full parser.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::error::ReelcatError;

/// The handful of fields the sizes report cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Stream frame rate, in frames per second.
    pub fps: f64,
    /// Stream bit rate marker ("tbr"), in frames per second.
    pub tbr: f64,
}

/// Matches a line like:
/// `Stream #0:0[0x1011]: Video: h264 ..., yuv420p, 1920x1080 [...], 25 fps, 50 tbr, ...`
static STREAM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Stream\s\#.+Video.+?(?P<width>\d+)x(?P<height>\d+)\,.+?(?P<fps>(?:[0-9]*[.])?[0-9]+)\sfps\,\s(?P<tbr>(?:[0-9]*[.])?[0-9]+)\stbr.+",
    )
    .expect("static ffprobe regex is valid")
});

/// Run `ffprobe` against `path` and parse its video stream banner.
pub async fn get_video_info(path: &Path) -> Result<VideoInfo, ReelcatError> {
    let full_path = path
        .canonicalize()
        .map_err(|_| ReelcatError::PathNotADirectory(path.to_path_buf()))?;

    let output = Command::new("ffprobe")
        .arg("-hide_banner")
        .arg(&full_path)
        .output()
        .await
        .map_err(|e| ReelcatError::spawn_failed("ffprobe", vec![full_path.to_string_lossy().into_owned()], e))?;

    // ffprobe writes its stream banner to stderr, not stdout.
    let text = String::from_utf8_lossy(&output.stderr);
    parse_ffprobe_output(&text)
}

fn parse_ffprobe_output(text: &str) -> Result<VideoInfo, ReelcatError> {
    for line in text.lines() {
        if let Some(captures) = STREAM_LINE.captures(line) {
            let width = captures["width"].parse().unwrap_or(0);
            let height = captures["height"].parse().unwrap_or(0);
            let fps = captures["fps"].parse().unwrap_or(0.0);
            let tbr = captures["tbr"].parse().unwrap_or(0.0);
            return Ok(VideoInfo { width, height, fps, tbr });
        }
    }
    Err(ReelcatError::Other(anyhow::anyhow!("could not parse ffprobe output")))
}
