//! Bounded-parallel dispatch loop: repeatedly finds a runnable task, hands
//! it to a worker under a semaphore permit, and waits for everything to
//! finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::executor::Executor;
use crate::core::monitor::Monitor;
use crate::core::task::Task;
use crate::core::timer::Timer;
use crate::error::ReelcatError;

/// How long to idle between scans when nothing is runnable yet but workers
/// are still in flight. Always real time: this is a polling-cadence detail,
/// not part of the virtual-time domain a `DeterministicTimer` exercises.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Run `tasks` to completion, dispatching up to `max_parallel_tasks`
/// workers at once and reporting progress through `monitor`.
///
/// Returns the first error any worker hit. Once a failure is observed no
/// new task is dispatched, but already-running workers are allowed to
/// finish before this returns.
pub async fn schedule_tasks(
    timer: Arc<dyn Timer>,
    tasks: Vec<Arc<Task>>,
    monitor: Arc<Monitor>,
    executor: Arc<dyn Executor>,
    max_parallel_tasks: usize,
) -> Result<(), ReelcatError> {
    let start_time = timer.now();
    let semaphore = Arc::new(Semaphore::new(max_parallel_tasks));
    let failed = Arc::new(AtomicBool::new(false));
    let first_error: Arc<Mutex<Option<ReelcatError>>> = Arc::new(Mutex::new(None));

    let ticker = monitor.clone().start();
    let mut workers: JoinSet<()> = JoinSet::new();

    loop {
        if failed.load(Ordering::Acquire) {
            break;
        }

        if all_tasks_completed(&tasks) {
            break;
        }

        let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");

        let Some(task) = find_first_runnable_task(&tasks) else {
            drop(permit);
            tokio::time::sleep(POLL_INTERVAL).await;
            continue;
        };

        task.mark_running();

        let monitor = monitor.clone();
        let executor = executor.clone();
        let failed = failed.clone();
        let first_error = first_error.clone();
        let task = task.clone();

        workers.spawn(async move {
            let _permit = permit;
            monitor.notify_task_begins(&task);

            let result = executor.execute(&task).await;
            task.mark_complete();
            monitor.notify_task_ends(&task);

            if let Err(e) = result {
                failed.store(true, Ordering::Release);
                let mut first_error = first_error.lock().unwrap();
                if first_error.is_none() {
                    *first_error = Some(e);
                }
            }
        });
    }

    while workers.join_next().await.is_some() {}

    if let Some(handle) = ticker {
        handle.abort();
    }
    monitor.shutdown_cleanly();

    let run_time = timer.seconds_since(start_time);
    log::info!("Elapsed (real) time: {}", crate::core::fs_util::nice_time(run_time));

    let total_compute_time: f64 = tasks.iter().map(|t| t.run_time_in_seconds()).sum();
    log::info!("Total compute time: {}", crate::core::fs_util::nice_time(total_compute_time));
    if run_time > 0.0 {
        log::info!(
            "Efficiency: {:.2}",
            total_compute_time / run_time / max_parallel_tasks as f64
        );
    }

    if let Some(error) = first_error.lock().unwrap().take() {
        return Err(error);
    }

    Ok(())
}

fn find_first_runnable_task(tasks: &[Arc<Task>]) -> Option<Arc<Task>> {
    tasks.iter().find(|t| t.can_run()).cloned()
}

fn all_tasks_completed(tasks: &[Arc<Task>]) -> bool {
    tasks.iter().all(|t| !t.is_not_completed())
}
