//! Default pipeline: scan, plan, schedule. Grounded on `GetBusy`'s non-report
//! branch in the original tool's `foreman.go`.

use std::sync::Arc;

use crate::cli::print_success;
use crate::config::Settings;
use crate::core::display::{Display, NoOpDisplay, TerminalDisplay};
use crate::core::executor::{DryRunExecutor, Executor, ProcessExecutor};
use crate::core::monitor::Monitor;
use crate::core::timer::{RealTimer, Timer};
use crate::core::{planner, scanner, scheduler};
use crate::error::ReelcatError;

/// Scan `settings.paths`, build the task graph, and run it to completion.
pub async fn execute(settings: &Settings) -> Result<(), ReelcatError> {
    let scanned = scanner::scan(&settings.paths)?;
    let tasks = planner::plan(settings, scanned)?;

    if settings.verbose {
        for task in &tasks {
            log::info!("{task}");
        }
    }

    let timer: Arc<dyn Timer> = Arc::new(RealTimer);
    let display: Box<dyn Display> = if settings.dry_run {
        Box::new(NoOpDisplay)
    } else {
        Box::new(TerminalDisplay::new())
    };
    let monitor = Monitor::new(timer.clone(), tasks.clone(), display, !settings.dry_run);

    let executor: Arc<dyn Executor> = if settings.dry_run {
        Arc::new(DryRunExecutor)
    } else {
        Arc::new(ProcessExecutor::new(Arc::new(settings.clone())))
    };

    scheduler::schedule_tasks(timer, tasks, monitor, executor, settings.max_parallel_tasks).await?;
    print_success("Archive run complete");
    Ok(())
}
