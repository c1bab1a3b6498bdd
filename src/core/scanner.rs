//! Non-recursive directory scan: the only filesystem-walking component.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ReelcatError;

/// A file discovered by the scanner, with its size in bytes.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Absolute or relative path as given by the walk.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

/// Scan each of `paths`, returning `(path, files)` pairs in the same order
/// the paths were given, with files listed in ascending size order.
///
/// Every path must be a directory. A nested subdirectory is fatal: this
/// scanner never recurses.
pub fn scan(paths: &[PathBuf]) -> Result<Vec<(PathBuf, Vec<ScannedFile>)>, ReelcatError> {
    let mut result = Vec::with_capacity(paths.len());

    for path in paths {
        log::debug!("Scanning {}...", path.display());

        let metadata = std::fs::metadata(path).map_err(|_| ReelcatError::PathNotADirectory(path.clone()))?;
        if !metadata.is_dir() {
            return Err(ReelcatError::PathNotADirectory(path.clone()));
        }

        let mut files = scan_one_directory(path)?;
        files.sort_by_key(|f| f.size);
        log::debug!("{} has {} file(s)", path.display(), files.len());
        result.push((path.clone(), files));
    }

    Ok(result)
}

fn scan_one_directory(path: &Path) -> Result<Vec<ScannedFile>, ReelcatError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            return Err(ReelcatError::RecursiveDirectory(entry.path().to_path_buf()));
        }
        let size = entry.metadata()?.len();
        files.push(ScannedFile {
            path: entry.path().to_path_buf(),
            size,
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_orders_files_by_ascending_size() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.mkv"), vec![0u8; 300]).unwrap();
        fs::write(dir.path().join("small.mkv"), vec![0u8; 10]).unwrap();

        let result = scan(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(result.len(), 1);
        let (_, files) = &result[0];
        assert_eq!(files.len(), 2);
        assert!(files[0].size < files[1].size);
    }

    #[test]
    fn test_scan_fails_on_nested_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let err = scan(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ReelcatError::RecursiveDirectory(_)));
    }

    #[test]
    fn test_scan_fails_on_non_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("not_a_dir.txt");
        fs::write(&file_path, b"hi").unwrap();

        let err = scan(&[file_path]).unwrap_err();
        assert!(matches!(err, ReelcatError::PathNotADirectory(_)));
    }

    #[test]
    fn test_scan_preserves_path_order() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        fs::write(dir_a.path().join("a.mkv"), b"a").unwrap();
        fs::write(dir_b.path().join("b.mkv"), b"b").unwrap();

        let result = scan(&[dir_b.path().to_path_buf(), dir_a.path().to_path_buf()]).unwrap();
        assert_eq!(result[0].0, dir_b.path());
        assert_eq!(result[1].0, dir_a.path());
    }
}
