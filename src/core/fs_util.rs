//! Small filesystem and formatting helpers shared across the core.

use std::path::{Path, PathBuf};

/// Reserve a unique path with the given extension under the OS temp directory
/// by creating the file and immediately removing it. The returned path is
/// then used by an external process as its own `--output`.
pub fn make_temporary_file(extension: &str) -> std::io::Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("reelcat.")
        .suffix(extension)
        .tempfile()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    std::fs::remove_file(&path)?;
    Ok(path)
}

/// Remove a temporary file, ignoring "not found" and other removal errors.
///
/// Temporary outputs are best-effort cleanup; a removal failure here must
/// never fail the run.
pub fn remove_temporary_file(path: &Path) {
    let _ = std::fs::remove_file(path);
}

/// The file extension of `path`, including the leading dot, or an empty
/// string if there is none.
pub fn file_extension(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}

/// The final path component, e.g. `basename("/a/b/c")` is `"c"`.
pub fn last_bit_of_path(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Format a byte count as a human-readable size, e.g. `"1.5 MiB"`.
pub fn nice_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    const SUFFIXES: &[u8] = b"KMGTPE";
    format!("{:.1} {}iB", bytes as f64 / div as f64, SUFFIXES[exp] as char)
}

/// Format a duration in seconds as `HHH:MM:SS`, or `"---:--:--"` for
/// `+Infinity` or negative values (the Estimator's "no data"/"overrun" signals).
pub fn nice_time(seconds: f64) -> String {
    if seconds.is_infinite() && seconds > 0.0 {
        return "---:--:--".to_string();
    }
    if seconds < 0.0 {
        return "---:--:--".to_string();
    }

    const SPM: i64 = 60;
    const SPH: i64 = 60 * 60;
    let mut s = seconds as i64;
    let mut h = 0;
    let mut m = 0;
    while s >= SPH {
        h += 1;
        s -= SPH;
    }
    while s >= SPM {
        m += 1;
        s -= SPM;
    }
    format!("{h:03}:{m:02}:{s:02}")
}
