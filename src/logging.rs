//! Logging initialisation.
//!
//! Initialised once at process start, after argument parsing, since the
//! `--log` flag decides the destination: a file, or standard output when
//! left empty.

use std::fs::OpenOptions;

use crate::config::Settings;
use crate::error::ReelcatError;

/// Initialise the global logger according to `settings.log` and `settings.verbose`.
pub fn init(settings: &Settings) -> Result<(), ReelcatError> {
    let level = if settings.verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    match &settings.log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(ReelcatError::Io)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stdout);
        }
    }

    builder.init();
    Ok(())
}
