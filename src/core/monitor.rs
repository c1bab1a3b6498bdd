//! Tracks active tasks, bridges the Estimator to the Display, and keeps the
//! rolling "recently" log the live display shows.

use std::sync::{Arc, Mutex};

use crate::core::display::Display;
use crate::core::estimator::Estimator;
use crate::core::fs_util::{nice_size, nice_time};
use crate::core::task::{Task, TaskKind};
use crate::core::timer::Timer;
use crate::error::ReelcatError;

const MAX_MESSAGES: usize = 16;

#[derive(Debug, Default)]
struct Stats {
    tasks_remaining: usize,
    tasks_completed: usize,
}

struct Inner {
    active_tasks: Vec<Arc<Task>>,
    messages: [String; MAX_MESSAGES],
    stats: Stats,
    estimator: Estimator,
}

impl Inner {
    fn add_message(&mut self, message: String) {
        log::info!("{message}");
        for i in (1..MAX_MESSAGES).rev() {
            self.messages[i] = self.messages[i - 1].clone();
        }
        self.messages[0] = message;
    }

    fn count_workers_of_kind(&self, kind: TaskKind) -> usize {
        self.active_tasks.iter().filter(|t| t.kind == kind).count()
    }
}

/// Coordinates the Estimator, the active-task set and the Display, all
/// behind one lock so a tick always sees a consistent snapshot.
pub struct Monitor {
    timer: Arc<dyn Timer>,
    all_tasks: Vec<Arc<Task>>,
    display: Mutex<Box<dyn Display>>,
    inner: Mutex<Inner>,
    live_display: bool,
}

impl Monitor {
    /// Build a monitor over `all_tasks`, rendering through `display` if
    /// `live_display` is set.
    pub fn new(timer: Arc<dyn Timer>, all_tasks: Vec<Arc<Task>>, display: Box<dyn Display>, live_display: bool) -> Arc<Monitor> {
        let tasks_remaining = all_tasks.len();
        let messages = std::array::from_fn(|_| "...".to_string());

        Arc::new(Monitor {
            timer,
            all_tasks,
            display: Mutex::new(display),
            inner: Mutex::new(Inner {
                active_tasks: Vec::new(),
                messages,
                stats: Stats {
                    tasks_remaining,
                    tasks_completed: 0,
                },
                estimator: Estimator::new(),
            }),
            live_display,
        })
    }

    /// Record that `task` has just transitioned to Running.
    pub fn notify_task_begins(&self, task: &Arc<Task>) {
        task.set_start_timestamp(self.timer.now());
        let mut inner = self.inner.lock().unwrap();
        inner.add_message(format!("Running task {}", task.brief_string()));
        inner.active_tasks.push(task.clone());
    }

    /// Record that `task` has just completed, feeding its observed runtime
    /// into the Estimator.
    pub fn notify_task_ends(&self, task: &Arc<Task>) {
        let run_time = self.timer.seconds_since(task.start_timestamp().expect("task was started"));
        task.set_run_time_in_seconds(run_time);

        let mut inner = self.inner.lock().unwrap();

        let index = inner.active_tasks.iter().position(|t| t.id == task.id);
        let Some(index) = index else { return };

        let bytes_per_second = task.input_size as f64 / task.run_time_in_seconds();
        inner.add_message(format!(
            "Completed task {} in {} ({}/s)",
            task.brief_string(),
            nice_time(task.run_time_in_seconds()),
            nice_size(bytes_per_second as u64)
        ));

        inner.stats.tasks_completed += 1;
        inner.stats.tasks_remaining = inner.stats.tasks_remaining.saturating_sub(1);

        let workers_of_this_kind = inner.count_workers_of_kind(task.kind);
        inner.estimator.update_estimates(task, workers_of_this_kind);
        let fix_audio_rate = inner.estimator.bytes_per_second(TaskKind::FixAudio);
        let transcode_rate = inner.estimator.bytes_per_second(TaskKind::Transcode);
        inner.add_message(format!(
            "Estimates computed: FixAudio {}/s, Transcode {}/s",
            nice_size(fix_audio_rate as u64),
            nice_size(transcode_rate as u64)
        ));

        inner.active_tasks.remove(index);
    }

    /// Spawn the background ticker that redraws the display roughly every
    /// 900ms, if live display is enabled. Consumes an `Arc` handle since the
    /// spawned task outlives this call; pass `monitor.clone()` if the caller
    /// still needs its own handle afterwards.
    pub fn start(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.live_display {
            return None;
        }

        {
            let mut display = self.display.lock().unwrap();
            if let Err(e) = display.init().and_then(|_| display.clear()) {
                log::warn!("Could not start the live display: {e}");
                return None;
            }
        }

        let monitor = self;
        Some(tokio::spawn(async move {
            let start_timestamp = monitor.timer.now();
            loop {
                let run_time = monitor.timer.seconds_since(start_timestamp);
                if let Err(e) = monitor.tick(run_time) {
                    log::warn!("Display tick failed: {e}");
                }
                monitor.timer.sleep(900).await;
            }
        }))
    }

    fn tick(&self, run_time_in_seconds: f64) -> Result<(), ReelcatError> {
        let mut inner = self.inner.lock().unwrap();

        let mut total_remaining = inner.estimator.estimate_remaining_run_time(&self.all_tasks);

        for i in 0..inner.active_tasks.len() {
            let task = inner.active_tasks[i].clone();
            let workers_of_this_kind = inner.count_workers_of_kind(task.kind);
            let run_time = self.timer.seconds_since(task.start_timestamp().expect("active task was started"));
            task.set_run_time_in_seconds(run_time);
            let remaining = inner.estimator.estimate_time_remaining(&task, workers_of_this_kind);
            task.set_estimated_remaining_time_in_seconds(remaining);
            total_remaining += remaining;
        }

        let mut display = self.display.lock().unwrap();
        display.clear()?;
        display.write(&format!(
            "Elapsed: {}, remaining: {}",
            nice_time(run_time_in_seconds),
            nice_time(total_remaining)
        ))?;
        display.write(&format!(
            "{} workers employed, {} tasks completed, {} remaining",
            inner.active_tasks.len(),
            inner.stats.tasks_completed,
            inner.stats.tasks_remaining
        ))?;
        display.write("Task     Kind          Size          Run time        ETA")?;
        display.write("-------+------------+-------------+---------------+----------------")?;

        for task in &inner.active_tasks {
            display.write(&format!(
                "{:>4}    {:<13}{:>11}   {:<16}{:<16}",
                task.id,
                task.kind.to_string(),
                task.size_description(),
                nice_time(task.run_time_in_seconds()),
                nice_time(task.estimated_remaining_time_in_seconds())
            ))?;
        }

        display.write("\nRecently:")?;
        for message in &inner.messages {
            display.write(&format!("   {message}"))?;
        }

        display.flush()?;
        Ok(())
    }

    /// Close the display cleanly, if it was started.
    pub fn shutdown_cleanly(&self) {
        log::info!("Clean shutdown requested");
        if self.live_display {
            let _ = self.display.lock().unwrap().close();
        }
    }
}
