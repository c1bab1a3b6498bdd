//! Per-task-kind throughput model: running bytes/second averages that
//! produce per-task ETAs and an aggregate remaining-runtime forecast.
//!
//! Every method here is only ever called while the Monitor already holds its
//! own lock, so `Estimator` carries no synchronisation primitive of its own.

use crate::config::{
    SEED_CONCATENATE_BYTES_PER_SECOND, SEED_FIX_AUDIO_BYTES_PER_SECOND, SEED_TRANSCODE_BYTES_PER_SECOND,
};
use crate::core::task::{Task, TaskKind};

/// Self-calibrating bytes/second model, one slot per [`TaskKind`].
#[derive(Debug)]
pub struct Estimator {
    total_input_size: [f64; TaskKind::COUNT],
    total_run_time: [f64; TaskKind::COUNT],
    bytes_per_second: [f64; TaskKind::COUNT],
    has_data: [bool; TaskKind::COUNT],
}

fn index(kind: TaskKind) -> usize {
    kind as usize
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator {
    /// Construct an estimator seeded with domain-derived defaults so a
    /// freshly started run has a meaningful forecast before anything
    /// completes. `has_data` starts false for every kind regardless: a seed
    /// is not "data" for per-task ETA purposes until a real completion lands.
    pub fn new() -> Self {
        let mut bytes_per_second = [0.0; TaskKind::COUNT];
        bytes_per_second[index(TaskKind::FixAudio)] = SEED_FIX_AUDIO_BYTES_PER_SECOND;
        bytes_per_second[index(TaskKind::Transcode)] = SEED_TRANSCODE_BYTES_PER_SECOND;
        bytes_per_second[index(TaskKind::Concatenate)] = SEED_CONCATENATE_BYTES_PER_SECOND;

        Estimator {
            total_input_size: [0.0; TaskKind::COUNT],
            total_run_time: [0.0; TaskKind::COUNT],
            bytes_per_second,
            has_data: [false; TaskKind::COUNT],
        }
    }

    /// Called when a worker completes a task, before any new task of that
    /// kind is dispatched. `workers_of_this_kind` is the number of tasks of
    /// `task.kind` active in the Monitor at the moment of completion,
    /// counting the completing task itself (see design note (a)).
    pub fn update_estimates(&mut self, task: &Task, workers_of_this_kind: usize) {
        let estimated = self.estimate_runtime(task, workers_of_this_kind);
        let actual = task.run_time_in_seconds();
        if actual > 0.0 {
            let error = (estimated - actual).abs() / actual;
            log::info!("Estimation error: {error:.2}  (e={estimated}, a={actual})");
        }

        let i = index(task.kind);
        self.total_input_size[i] += task.input_size as f64;
        self.total_run_time[i] += actual;

        let bps_all_workers = self.total_input_size[i] / self.total_run_time[i];
        self.bytes_per_second[i] = bps_all_workers * workers_of_this_kind as f64;
        self.has_data[i] = true;
    }

    /// The current estimated bytes/second for `kind` (seed or learned).
    pub fn bytes_per_second(&self, kind: TaskKind) -> f64 {
        self.bytes_per_second[index(kind)]
    }

    /// Expected total wall time for `task` given `workers_of_this_kind`
    /// concurrent workers sharing `kind`'s aggregate throughput.
    pub fn estimate_runtime(&self, task: &Task, workers_of_this_kind: usize) -> f64 {
        let bps_for_this_worker = self.bytes_per_second(task.kind) / workers_of_this_kind as f64;
        task.input_size as f64 / bps_for_this_worker
    }

    /// How much longer `task` is expected to run.
    ///
    /// Returns `+Infinity` if no completion has yet updated `task.kind`'s
    /// data (even though a finite seed may be in use), `-Infinity` if the
    /// task has already overrun its estimate, else a non-negative value.
    pub fn estimate_time_remaining(&self, task: &Task, workers_of_this_kind: usize) -> f64 {
        if !self.has_data[index(task.kind)] {
            return f64::INFINITY;
        }

        let remaining = self.estimate_runtime(task, workers_of_this_kind) - task.run_time_in_seconds();
        if remaining < 0.0 {
            f64::NEG_INFINITY
        } else {
            remaining
        }
    }

    /// Sum of per-task estimates over every not-yet-Complete task, using
    /// each kind's current (seed or learned) rate. Defined even before any
    /// completion, unlike [`Self::estimate_time_remaining`].
    pub fn estimate_remaining_run_time(&self, tasks: &[std::sync::Arc<Task>]) -> f64 {
        tasks
            .iter()
            .filter(|t| t.is_not_completed())
            .map(|t| t.input_size as f64 / self.bytes_per_second(t.kind))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn task_of(kind: TaskKind, size: u64, run_time: f64) -> Arc<Task> {
        let task = Task::new(kind, PathBuf::from("in"), PathBuf::from("out"), size);
        task.set_run_time_in_seconds(run_time);
        task
    }

    // S1: one solo completion.
    #[test]
    fn test_one_solo_completion() {
        let mut estimator = Estimator::new();
        let task = task_of(TaskKind::FixAudio, 3000, 6.0);
        estimator.update_estimates(&task, 1);
        assert!((estimator.bytes_per_second(TaskKind::FixAudio) - 500.0).abs() < 1e-9);
    }

    // S2: two serial completions of the same kind.
    #[test]
    fn test_two_serial_completions() {
        let mut estimator = Estimator::new();
        let t1 = task_of(TaskKind::FixAudio, 3000, 6.0);
        estimator.update_estimates(&t1, 1);
        let t2 = task_of(TaskKind::FixAudio, 2000, 3.0);
        estimator.update_estimates(&t2, 1);

        let expected = (3000.0 + 2000.0) / (6.0 + 3.0);
        assert!((estimator.bytes_per_second(TaskKind::FixAudio) - expected).abs() < 1e-6);
    }

    // S3: two tasks run in parallel, one completes.
    #[test]
    fn test_parallel_completion_infers_solo_rate() {
        let mut estimator = Estimator::new();
        let t1 = task_of(TaskKind::FixAudio, 3000, 6.0);
        estimator.update_estimates(&t1, 2);
        assert!((estimator.bytes_per_second(TaskKind::FixAudio) - 1000.0).abs() < 1e-9);
    }

    // S4: overrun.
    #[test]
    fn test_overrun_returns_negative_infinity() {
        let mut estimator = Estimator::new();
        let t1 = task_of(TaskKind::FixAudio, 3000, 5.0);
        estimator.update_estimates(&t1, 1);

        let t2 = task_of(TaskKind::FixAudio, 3000, 20.0);
        assert_eq!(estimator.estimate_time_remaining(&t2, 1), f64::NEG_INFINITY);
    }

    // S5: no data yet.
    #[test]
    fn test_no_data_returns_positive_infinity() {
        let estimator = Estimator::new();
        let task = task_of(TaskKind::FixAudio, 3000, 0.0);
        assert_eq!(estimator.estimate_time_remaining(&task, 1), f64::INFINITY);
    }

    // S6: remaining run time using seeds, with cost/MB fixed at 10s.
    #[test]
    fn test_remaining_run_time_with_seeds() {
        let mut estimator = Estimator::new();
        let mb = 1_000_000.0;
        estimator.bytes_per_second[index(TaskKind::FixAudio)] = mb / 10.0;

        let t1 = task_of(TaskKind::FixAudio, 1_000_000, 0.0);
        let t2 = task_of(TaskKind::FixAudio, 2_000_000, 0.0);
        let t3 = task_of(TaskKind::FixAudio, 3_000_000, 0.0);
        let tasks = vec![t1.clone(), t2.clone(), t3.clone()];

        assert!((estimator.estimate_remaining_run_time(&tasks) - 60.0).abs() < 1e-6);

        t1.set_run_time_in_seconds(20.0);
        t1.mark_running();
        t1.mark_complete();
        estimator.update_estimates(&t1, 1);
        assert!((estimator.estimate_remaining_run_time(&tasks) - (2.0 + 3.0) * 20.0).abs() < 1e-6);

        t2.set_run_time_in_seconds(5.0);
        t2.mark_running();
        t2.mark_complete();
        estimator.update_estimates(&t2, 1);
        let expected_bps = (1_000_000.0 + 2_000_000.0) / (20.0 + 5.0);
        assert!((estimator.bytes_per_second(TaskKind::FixAudio) - expected_bps).abs() < 1e-6);
        assert!((estimator.estimate_remaining_run_time(&tasks) - 3.0 * (25.0 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_runtime_scales_with_workers() {
        let estimator = Estimator::new();
        let task = task_of(TaskKind::Transcode, 200_000, 0.0);
        let solo = estimator.estimate_runtime(&task, 1);
        let with_two_workers = estimator.estimate_runtime(&task, 2);
        assert!((with_two_workers - solo * 2.0).abs() < 1e-6);
    }
}
