//! The task graph: typed nodes with state, dependencies, sizes and timings.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::core::fs_util::{nice_size, nice_time};

/// The three kinds of work a task can represent.
///
/// Declaration order is also priority order: a smaller ordinal is dispatched
/// ahead of a larger one when both are runnable (`FixAudio < Transcode <
/// Concatenate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TaskKind {
    /// Demux/re-encode-audio/remux pass ahead of a transcode.
    FixAudio = 0,
    /// Two-pass re-encode of a source file.
    Transcode = 1,
    /// Stream-copy concatenation of a directory's transcoded outputs.
    Concatenate = 2,
}

impl TaskKind {
    /// Number of distinct task kinds; used to size per-kind arrays.
    pub const COUNT: usize = 3;

    /// All kinds, in priority order.
    pub const ALL: [TaskKind; Self::COUNT] = [TaskKind::FixAudio, TaskKind::Transcode, TaskKind::Concatenate];
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskKind::FixAudio => "FixAudio",
            TaskKind::Transcode => "Transcode",
            TaskKind::Concatenate => "Concatenate",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a task. Transitions strictly Pending -> Running -> Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    /// Not yet started.
    Pending = 0,
    /// Currently being executed by a worker.
    Running = 1,
    /// Finished.
    Complete = 2,
}

impl From<u8> for TaskState {
    fn from(value: u8) -> Self {
        match value {
            0 => TaskState::Pending,
            1 => TaskState::Running,
            _ => TaskState::Complete,
        }
    }
}

/// Timing fields, grouped so they are always updated consistently.
#[derive(Debug, Default)]
struct Timing {
    start_timestamp: Option<Instant>,
    run_time_in_seconds: f64,
    estimated_remaining_time_in_seconds: f64,
}

/// A node in the dependency graph.
///
/// `state` uses a lock-free atomic since `canRun()` is polled in the hot
/// scheduler loop; the timing trio lives behind a single mutex since it is
/// only ever touched while the Monitor lock is already held.
#[derive(Debug)]
pub struct Task {
    /// Unique, monotonically increasing identifier.
    pub id: u64,
    /// Which external process this task dispatches to.
    pub kind: TaskKind,
    /// Size in bytes of the source file; 0 for Concatenate.
    pub input_size: u64,
    /// Source path; empty for Concatenate.
    pub file_in: PathBuf,
    /// Destination path this task produces.
    pub file_out: PathBuf,
    /// Predecessor tasks that must be Complete before this one can run.
    pub depends_on: Vec<Arc<Task>>,
    state: AtomicU8,
    timing: Mutex<Timing>,
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

impl Task {
    /// Construct a new Pending task, assigning it the next run-global id.
    pub fn new(kind: TaskKind, file_in: PathBuf, file_out: PathBuf, input_size: u64) -> Arc<Task> {
        Arc::new(Task {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            input_size,
            file_in,
            file_out,
            depends_on: Vec::new(),
            state: AtomicU8::new(TaskState::Pending as u8),
            timing: Mutex::new(Timing::default()),
        })
    }

    /// Reset the id counter. Test-only: keeps task ids stable across test runs.
    #[doc(hidden)]
    pub fn reset_id_counter_for_test() {
        NEXT_TASK_ID.store(1, Ordering::SeqCst);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        TaskState::from(self.state.load(Ordering::Acquire))
    }

    /// Whether this task is Pending and every predecessor is Complete.
    pub fn can_run(&self) -> bool {
        if self.state() != TaskState::Pending {
            return false;
        }
        self.depends_on.iter().all(|d| d.state() == TaskState::Complete)
    }

    /// Whether this task has not yet reached Complete.
    pub fn is_not_completed(&self) -> bool {
        self.state() != TaskState::Complete
    }

    /// Transition Pending -> Running. The only mutator besides `mark_complete`.
    pub fn mark_running(&self) {
        self.state.store(TaskState::Running as u8, Ordering::Release);
    }

    /// Transition Running -> Complete.
    pub fn mark_complete(&self) {
        self.state.store(TaskState::Complete as u8, Ordering::Release);
    }

    /// Record that execution began at `now`.
    pub fn set_start_timestamp(&self, now: Instant) {
        self.timing.lock().unwrap().start_timestamp = Some(now);
    }

    /// The timestamp execution began, if it has.
    pub fn start_timestamp(&self) -> Option<Instant> {
        self.timing.lock().unwrap().start_timestamp
    }

    /// Seconds this task has been running (or ran for, once complete).
    pub fn run_time_in_seconds(&self) -> f64 {
        self.timing.lock().unwrap().run_time_in_seconds
    }

    /// Update the recorded run time.
    pub fn set_run_time_in_seconds(&self, seconds: f64) {
        self.timing.lock().unwrap().run_time_in_seconds = seconds;
    }

    /// The most recently computed remaining-time estimate.
    pub fn estimated_remaining_time_in_seconds(&self) -> f64 {
        self.timing.lock().unwrap().estimated_remaining_time_in_seconds
    }

    /// Update the recorded remaining-time estimate.
    pub fn set_estimated_remaining_time_in_seconds(&self, seconds: f64) {
        self.timing.lock().unwrap().estimated_remaining_time_in_seconds = seconds;
    }

    /// Priority ordering used by the Planner: same kind sorts by descending
    /// size (biggest first); different kinds sort by ascending kind ordinal.
    pub fn less_than(&self, other: &Task) -> bool {
        if self.kind == other.kind {
            self.input_size > other.input_size
        } else {
            self.kind < other.kind
        }
    }

    /// Human-sized description of this task's workload.
    pub fn size_description(&self) -> String {
        match self.kind {
            TaskKind::Transcode | TaskKind::FixAudio => nice_size(self.input_size),
            TaskKind::Concatenate => format!("{} items", self.depends_on.len()),
        }
    }

    /// One-line summary used in log/monitor messages: `#id Kind size`.
    pub fn brief_string(&self) -> String {
        format!("#{} {} {}", self.id, self.kind, self.size_description())
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state() {
            TaskState::Running => "Running".to_string(),
            TaskState::Pending if self.can_run() => "Runnable".to_string(),
            TaskState::Pending => format!("Pending ({} dependees)", self.depends_on.len()),
            TaskState::Complete => "Complete".to_string(),
        };
        match self.kind {
            TaskKind::Concatenate => write!(
                f,
                "{}\n  Type: Concatenate\n  State: {state}\n  To: {}",
                self.id,
                self.file_out.display()
            ),
            _ => write!(
                f,
                "{}\n  Type: {}\n  State: {state}\n  From: {}\n  To: {}",
                self.id,
                self.kind,
                self.file_in.display(),
                self.file_out.display()
            ),
        }
    }
}

/// Total remaining run time for `tasks`, using `estimated_remaining_time_in_seconds`
/// on tasks that already have one and the timer-agnostic `nice_time` elsewhere.
pub fn total_not_completed(tasks: &[Arc<Task>]) -> usize {
    tasks.iter().filter(|t| t.is_not_completed()).count()
}
