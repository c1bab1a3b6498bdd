use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn create_test_directory(root: &std::path::Path, name: &str, file_sizes: &[usize]) -> std::path::PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (i, size) in file_sizes.iter().enumerate() {
        fs::write(dir.join(format!("clip_{i}.mkv")), vec![0u8; *size]).unwrap();
    }
    dir
}

#[test]
fn test_dry_run_reports_task_count_without_touching_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let movie_dir = create_test_directory(temp_dir.path(), "holiday", &[10, 200]);
    let output_root = temp_dir.path().join("out");

    let mut cmd = Command::cargo_bin("reelcat").unwrap();
    cmd.arg("--dry-run")
        .arg("--verbose")
        .arg("--output-root")
        .arg(&output_root)
        .arg(&movie_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("tasks to be scheduled"));

    assert!(!output_root.exists(), "dry run must not create the output directory");
}

#[test]
fn test_rejects_nested_directory() {
    let temp_dir = TempDir::new().unwrap();
    let movie_dir = create_test_directory(temp_dir.path(), "holiday", &[10]);
    fs::create_dir(movie_dir.join("nested")).unwrap();

    let mut cmd = Command::cargo_bin("reelcat").unwrap();
    cmd.arg("--dry-run").arg(&movie_dir).assert().failure().code(1);
}

#[test]
fn test_rejects_missing_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist");

    let mut cmd = Command::cargo_bin("reelcat").unwrap();
    cmd.arg("--dry-run").arg(&missing).assert().failure().code(1);
}

#[test]
fn test_refuses_to_overwrite_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let movie_dir = create_test_directory(temp_dir.path(), "holiday", &[10]);
    let output_root = temp_dir.path().join("out");
    fs::create_dir_all(&output_root).unwrap();
    fs::write(output_root.join("holiday.mp4"), b"already here").unwrap();

    let mut cmd = Command::cargo_bin("reelcat").unwrap();
    cmd.arg("--dry-run")
        .arg("--output-root")
        .arg(&output_root)
        .arg(&movie_dir)
        .assert()
        .failure()
        .code(1);
}
