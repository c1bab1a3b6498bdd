//! Error types for the reelcat CLI.
//!
//! This module defines the `ReelcatError` enum covering every fatal
//! condition the tool can hit: argument validation, directory scanning,
//! external-process invocation, and terminal-display setup.
use std::path::PathBuf;

use thiserror::Error;

/// Represents all possible errors raised while planning or running a job.
///
/// Each variant maps to an exit code via [`ReelcatError::exit_code`] and to
/// a user-facing message via [`ReelcatError::user_friendly_message`].
#[derive(Error, Debug)]
pub enum ReelcatError {
    /// I/O operation failed during file system access.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings failed validation (bad flag combination, no inputs, etc).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A path given on the command line does not exist or is not a directory.
    #[error("Path not found or not a directory: {0}")]
    PathNotADirectory(PathBuf),

    /// A directory scan found a nested subdirectory; recursion is not supported.
    #[error("Recursive directories are not handled: {0}")]
    RecursiveDirectory(PathBuf),

    /// Unable to read the specified directory.
    #[error("Unable to read directory: {path}")]
    DirectoryReadError {
        /// The directory path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The planner's concatenation target already exists.
    #[error("File already exists: {0}")]
    OutputAlreadyExists(PathBuf),

    /// An external process (ffmpeg/HandBrakeCLI/ffprobe) failed.
    #[error("command failed: {command}")]
    ExternalProcessFailed {
        /// The program that was invoked.
        command: String,
        /// The arguments it was invoked with.
        args: Vec<String>,
        /// Exit status, if the process ran to completion.
        status: Option<i32>,
        /// The underlying spawn error, if the process could not even start.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The live terminal display could not be initialised.
    #[error("Failed to initialise the terminal display: {0}")]
    DisplayInit(String),

    /// Catch-all error variant wrapping any other failure.
    #[error("Unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Specialized `Result` type for reelcat operations.
pub type ReelcatResult<T> = Result<T, ReelcatError>;

impl From<walkdir::Error> for ReelcatError {
    fn from(err: walkdir::Error) -> Self {
        match err.path() {
            Some(path) => ReelcatError::DirectoryReadError {
                path: path.to_path_buf(),
                source: err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk failed")),
            },
            None => ReelcatError::Other(anyhow::anyhow!(err.to_string())),
        }
    }
}

impl ReelcatError {
    /// Create a configuration error with the given message.
    pub fn config<S: Into<String>>(message: S) -> Self {
        ReelcatError::Config {
            message: message.into(),
        }
    }

    /// Create an external-process failure that never managed to spawn.
    pub fn spawn_failed(command: impl Into<String>, args: Vec<String>, source: std::io::Error) -> Self {
        ReelcatError::ExternalProcessFailed {
            command: command.into(),
            args,
            status: None,
            source: Some(source),
        }
    }

    /// Create an external-process failure for a process that exited non-zero.
    pub fn exit_failed(command: impl Into<String>, args: Vec<String>, status: Option<i32>) -> Self {
        ReelcatError::ExternalProcessFailed {
            command: command.into(),
            args,
            status,
            source: None,
        }
    }

    /// Return the corresponding exit code for this error variant.
    ///
    /// Every fatal condition exits `1`, matching `fatal()` in the original
    /// tool: there is only success and failure, no finer-grained codes.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Return a user-friendly error message with a suggested remedy.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ReelcatError::Io(e) => format!("File operation error: {e}"),
            ReelcatError::Config { message } => {
                format!("Configuration error: {message}\nHint: run 'reelcat --help' for usage")
            }
            ReelcatError::PathNotADirectory(path) => {
                format!("{} is not a directory\nHint: pass one or more input directories", path.display())
            }
            ReelcatError::RecursiveDirectory(path) => format!(
                "{} contains a subdirectory\nHint: reelcat does not walk directory trees recursively",
                path.display()
            ),
            ReelcatError::DirectoryReadError { path, source } => {
                format!("Could not read {}: {source}", path.display())
            }
            ReelcatError::OutputAlreadyExists(path) => format!(
                "{} already exists\nHint: remove it or choose a different --output-root",
                path.display()
            ),
            ReelcatError::ExternalProcessFailed {
                command,
                args,
                status,
                source,
            } => {
                let invocation = format!("{command} {}", args.join(" "));
                match (status, source) {
                    (Some(code), _) => format!("{invocation}\nexited with status {code}"),
                    (None, Some(err)) => format!("{invocation}\ncould not be started: {err}"),
                    (None, None) => format!("{invocation}\nfailed"),
                }
            }
            ReelcatError::DisplayInit(msg) => {
                format!("Could not start the live display: {msg}\nHint: pass --dry-run or run from a real terminal")
            }
            ReelcatError::Other(err) => format!("Unknown error: {err}\nHint: please file an issue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error_creation() {
        let error = ReelcatError::config("bad flag");
        assert!(matches!(error, ReelcatError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: bad flag");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ReelcatError = io_error.into();
        assert!(matches!(err, ReelcatError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ReelcatError::config("x").exit_code(), 1);
        assert_eq!(
            ReelcatError::OutputAlreadyExists(PathBuf::from("out/a.mp4")).exit_code(),
            1
        );
        assert_eq!(
            ReelcatError::exit_failed("ffmpeg", vec!["-i".into()], Some(1)).exit_code(),
            1
        );
    }

    #[test]
    fn test_user_friendly_message_hints_at_help() {
        let message = ReelcatError::config("missing paths").user_friendly_message();
        assert!(message.contains("Configuration error:"));
        assert!(message.contains("reelcat --help"));
    }

    #[test]
    fn test_external_process_failed_message() {
        let err = ReelcatError::exit_failed("HandBrakeCLI", vec!["--input".into(), "a.mkv".into()], Some(1));
        let message = err.user_friendly_message();
        assert!(message.contains("HandBrakeCLI"));
        assert!(message.contains("exited with status 1"));
    }
}
