//! Builds the per-directory sub-DAG (FixAudio -> Transcode -> Concatenate)
//! and sorts the flat task list into priority order.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::core::fs_util;
use crate::core::scanner::ScannedFile;
use crate::core::task::{Task, TaskKind};
use crate::error::ReelcatError;

/// Build the flat, priority-sorted task list for a run.
///
/// `scanned` is the scanner's output: directories in command-line order,
/// each with its files in ascending size order.
pub fn plan(settings: &Settings, scanned: Vec<(PathBuf, Vec<ScannedFile>)>) -> Result<Vec<Arc<Task>>, ReelcatError> {
    if !settings.dry_run {
        std::fs::create_dir_all(&settings.output_root)?;
    }

    let mut tasks = Vec::new();

    for (dir, files) in scanned {
        let mut concatenate_dependees = Vec::with_capacity(files.len());

        for file in &files {
            let transcode_file_out = fs_util::make_temporary_file(".mp4")?;
            let mut transcode_task = Task::new(
                TaskKind::Transcode,
                file.path.clone(),
                transcode_file_out,
                file.size,
            );

            if settings.fix_audio {
                let extension = fs_util::file_extension(&file.path);
                let fix_audio_file_out = fs_util::make_temporary_file(&extension)?;
                let fix_audio_task = Task::new(
                    TaskKind::FixAudio,
                    file.path.clone(),
                    fix_audio_file_out.clone(),
                    file.size,
                );

                Arc::get_mut(&mut transcode_task)
                    .expect("freshly constructed transcode task is uniquely owned")
                    .file_in = fix_audio_file_out;
                Arc::get_mut(&mut transcode_task)
                    .expect("freshly constructed transcode task is uniquely owned")
                    .depends_on
                    .push(fix_audio_task.clone());

                tasks.push(fix_audio_task);
            }

            concatenate_dependees.push(transcode_task.clone());
            tasks.push(transcode_task);
        }

        let final_name = fs_util::last_bit_of_path(&dir);
        let final_file_out = settings.output_root.join(format!("{final_name}.mp4"));

        if final_file_out.exists() {
            return Err(ReelcatError::OutputAlreadyExists(final_file_out));
        }

        let mut concatenate_task = Task::new(TaskKind::Concatenate, PathBuf::new(), final_file_out, 0);
        Arc::get_mut(&mut concatenate_task)
            .expect("freshly constructed concatenate task is uniquely owned")
            .depends_on = concatenate_dependees;
        tasks.push(concatenate_task);
    }

    sort_tasks(&mut tasks);

    log::info!("{} tasks to be scheduled", tasks.len());
    Ok(tasks)
}

/// Sort the flat task list by [`Task::less_than`]: FixAudio first (largest
/// input first), then Transcode (largest first), then Concatenate.
fn sort_tasks(tasks: &mut [Arc<Task>]) {
    tasks.sort_by(|a, b| {
        if a.less_than(b) {
            std::cmp::Ordering::Less
        } else if b.less_than(a) {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::core::scanner::ScannedFile;
    use clap::Parser;
    use tempfile::TempDir;

    fn settings_for(output_root: PathBuf, fix_audio: bool) -> Settings {
        let cli = Cli::parse_from(["reelcat", "videos"]);
        let mut settings = Settings::from_cli(cli).unwrap();
        settings.output_root = output_root;
        settings.fix_audio = fix_audio;
        settings
    }

    #[test]
    fn test_plan_builds_transcode_and_concatenate() {
        let out = TempDir::new().unwrap();
        let settings = settings_for(out.path().join("out"), false);
        let scanned = vec![(
            PathBuf::from("/movies/holiday"),
            vec![
                ScannedFile { path: PathBuf::from("a.mkv"), size: 10 },
                ScannedFile { path: PathBuf::from("b.mkv"), size: 200 },
            ],
        )];

        let tasks = plan(&settings, scanned).unwrap();
        let transcodes: Vec<_> = tasks.iter().filter(|t| t.kind == TaskKind::Transcode).collect();
        let concatenates: Vec<_> = tasks.iter().filter(|t| t.kind == TaskKind::Concatenate).collect();
        assert_eq!(transcodes.len(), 2);
        assert_eq!(concatenates.len(), 1);
        assert_eq!(concatenates[0].depends_on.len(), 2);
        assert_eq!(concatenates[0].file_out, settings.output_root.join("holiday.mp4"));
    }

    #[test]
    fn test_plan_inserts_fix_audio_ahead_of_transcode() {
        let out = TempDir::new().unwrap();
        let settings = settings_for(out.path().join("out"), true);
        let scanned = vec![(
            PathBuf::from("/movies/holiday"),
            vec![ScannedFile { path: PathBuf::from("a.mkv"), size: 10 }],
        )];

        let tasks = plan(&settings, scanned).unwrap();
        let fix_audio = tasks.iter().find(|t| t.kind == TaskKind::FixAudio).unwrap();
        let transcode = tasks.iter().find(|t| t.kind == TaskKind::Transcode).unwrap();
        assert_eq!(transcode.depends_on.len(), 1);
        assert_eq!(transcode.depends_on[0].id, fix_audio.id);
        assert_eq!(transcode.file_in, fix_audio.file_out);
    }

    #[test]
    fn test_plan_fails_if_output_exists() {
        let out = TempDir::new().unwrap();
        let output_root = out.path().join("out");
        std::fs::create_dir_all(&output_root).unwrap();
        std::fs::write(output_root.join("holiday.mp4"), b"existing").unwrap();

        let settings = settings_for(output_root, false);
        let scanned = vec![(
            PathBuf::from("/movies/holiday"),
            vec![ScannedFile { path: PathBuf::from("a.mkv"), size: 10 }],
        )];

        let err = plan(&settings, scanned).unwrap_err();
        assert!(matches!(err, ReelcatError::OutputAlreadyExists(_)));
    }

    #[test]
    fn test_sort_orders_fix_audio_then_transcode_then_concatenate() {
        let mut tasks = vec![
            Task::new(TaskKind::Concatenate, PathBuf::new(), PathBuf::from("c"), 0),
            Task::new(TaskKind::Transcode, PathBuf::new(), PathBuf::from("t"), 100),
            Task::new(TaskKind::FixAudio, PathBuf::new(), PathBuf::from("f"), 50),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(tasks[0].kind, TaskKind::FixAudio);
        assert_eq!(tasks[1].kind, TaskKind::Transcode);
        assert_eq!(tasks[2].kind, TaskKind::Concatenate);
    }
}
