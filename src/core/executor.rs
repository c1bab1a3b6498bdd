//! Dispatches a completed plan node to the external tool that does the
//! actual work: HandBrakeCLI for transcodes, ffmpeg for audio-fix and
//! concatenation passes.

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::Settings;
use crate::core::fs_util::{file_extension, make_temporary_file, remove_temporary_file};
use crate::core::task::{Task, TaskKind};
use crate::error::ReelcatError;

/// Runs a [`Task`] to completion by invoking whatever external process its
/// kind requires.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute `task`. On success, `task.file_out` exists and is ready for
    /// any task that depends on it.
    async fn execute(&self, task: &Task) -> Result<(), ReelcatError>;
}

/// Invokes HandBrakeCLI/ffmpeg as real child processes.
pub struct ProcessExecutor {
    settings: std::sync::Arc<Settings>,
}

impl ProcessExecutor {
    /// Build an executor bound to the run's settings (quality, decomb, etc).
    pub fn new(settings: std::sync::Arc<Settings>) -> Self {
        ProcessExecutor { settings }
    }

    async fn do_transcode(&self, task: &Task) -> Result<(), ReelcatError> {
        let mut args: Vec<String> = vec![
            "--input".into(),
            task.file_in.to_string_lossy().into_owned(),
            "--output".into(),
            task.file_out.to_string_lossy().into_owned(),
            "--encoder".into(),
            "x265".into(),
            "--quality".into(),
            self.settings.quality.to_string(),
            "--two-pass".into(),
            "--turbo".into(),
            "--aencoder".into(),
            "copy".into(),
            "--loose-anamorphic".into(),
        ];

        if self.settings.decomb {
            args.push("--comb-detect=default".into());
            args.push("--decomb=eedi2bob".into());
        }
        if let Some(width) = self.settings.width {
            args.push("--width".into());
            args.push(width.to_string());
        }
        if let Some(height) = self.settings.height {
            args.push("--height".into());
            args.push(height.to_string());
        }

        invoke("HandBrakeCLI", &args).await
    }

    async fn do_fix_audio(&self, task: &Task) -> Result<(), ReelcatError> {
        let audio_stream = make_temporary_file(".mp3")?;
        let video_stream = make_temporary_file(&file_extension(&task.file_in))?;

        invoke(
            "ffmpeg",
            &[
                "-i".into(),
                task.file_in.to_string_lossy().into_owned(),
                "-map".into(),
                "0:0".into(),
                "-codec".into(),
                "copy".into(),
                video_stream.to_string_lossy().into_owned(),
            ],
        )
        .await?;

        invoke(
            "ffmpeg",
            &[
                "-i".into(),
                task.file_in.to_string_lossy().into_owned(),
                "-map".into(),
                "0:1".into(),
                "-codec".into(),
                "mp3".into(),
                audio_stream.to_string_lossy().into_owned(),
            ],
        )
        .await?;

        let result = invoke(
            "ffmpeg",
            &[
                "-i".into(),
                video_stream.to_string_lossy().into_owned(),
                "-i".into(),
                audio_stream.to_string_lossy().into_owned(),
                "-map".into(),
                "0:v:0".into(),
                "-map".into(),
                "1:a:0".into(),
                "-acodec".into(),
                "copy".into(),
                "-vcodec".into(),
                "copy".into(),
                "-shortest".into(),
                task.file_out.to_string_lossy().into_owned(),
            ],
        )
        .await;

        remove_temporary_file(&audio_stream);
        remove_temporary_file(&video_stream);
        result
    }

    async fn do_concatenate(&self, task: &Task) -> Result<(), ReelcatError> {
        let list_file = make_temporary_file(".list")?;

        let mut contents = String::new();
        for dependee in &task.depends_on {
            if self.settings.verbose {
                log::info!("Add file {}", dependee.file_out.display());
            }
            contents.push_str(&format!("file {}\n", dependee.file_out.display()));
        }
        std::fs::write(&list_file, contents)?;
        if self.settings.verbose {
            log::info!("Wrote concatenation list to {}", list_file.display());
        }

        let result = invoke(
            "ffmpeg",
            &[
                "-f".into(),
                "concat".into(),
                "-safe".into(),
                "0".into(),
                "-i".into(),
                list_file.to_string_lossy().into_owned(),
                "-c".into(),
                "copy".into(),
                task.file_out.to_string_lossy().into_owned(),
            ],
        )
        .await;

        if result.is_ok() {
            for dependee in &task.depends_on {
                remove_temporary_file(&dependee.file_out);
            }
            remove_temporary_file(&list_file);
        }

        result
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, task: &Task) -> Result<(), ReelcatError> {
        match task.kind {
            TaskKind::Transcode => self.do_transcode(task).await,
            TaskKind::FixAudio => self.do_fix_audio(task).await,
            TaskKind::Concatenate => self.do_concatenate(task).await,
        }
    }
}

async fn invoke(command: &str, args: &[String]) -> Result<(), ReelcatError> {
    log::debug!("{command} {}", args.join(" "));

    let output = Command::new(command)
        .args(args)
        .output()
        .await
        .map_err(|e| ReelcatError::spawn_failed(command, args.to_vec(), e))?;

    if !output.status.success() {
        return Err(ReelcatError::exit_failed(command, args.to_vec(), output.status.code()));
    }

    Ok(())
}

/// Never spawns a process; used for `--dry-run`. Logs what would have run
/// and marks every task as instantaneously successful.
pub struct DryRunExecutor;

#[async_trait]
impl Executor for DryRunExecutor {
    async fn execute(&self, task: &Task) -> Result<(), ReelcatError> {
        log::info!("(dry run) would execute {}", task.brief_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_dry_run_executor_never_fails() {
        let task = Task::new(TaskKind::Transcode, PathBuf::from("in.mkv"), PathBuf::from("out.mp4"), 100);
        let executor = DryRunExecutor;
        executor.execute(&task).await.unwrap();
    }

    #[tokio::test]
    async fn test_process_executor_reports_spawn_failure() {
        let err = invoke("reelcat-definitely-not-a-real-binary", &[]).await.unwrap_err();
        assert!(matches!(err, ReelcatError::ExternalProcessFailed { .. }));
    }
}
