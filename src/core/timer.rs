//! Abstract clock so time-critical code can be exercised with virtual time.
//!
//! Every other component accepts an `Arc<dyn Timer>` rather than calling
//! `std::time`/`tokio::time` directly, so a deterministic clock can stand in
//! during tests.

use std::time::Instant;

use async_trait::async_trait;

/// A capability triple: current timestamp, seconds-since, and sleep.
#[async_trait]
pub trait Timer: Send + Sync {
    /// The current timestamp.
    fn now(&self) -> Instant;

    /// Seconds elapsed since `since`.
    fn seconds_since(&self, since: Instant) -> f64 {
        self.now().saturating_duration_since(since).as_secs_f64()
    }

    /// Sleep for approximately `millis` milliseconds of this timer's time.
    async fn sleep(&self, millis: u64);
}

/// The real clock; delegates to `tokio::time`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTimer;

#[async_trait]
impl Timer for RealTimer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, millis: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
    }
}

/// A deterministic virtual clock driven by [`DeterministicTimer::advance`].
///
/// Kept as an ordinary `pub` item (not `#[cfg(test)]`-gated) so both unit
/// tests and black-box integration tests under `tests/` can import it.
pub mod deterministic {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use super::Timer;

    /// A clock whose notion of "now" only moves when [`advance`](Self::advance) is called.
    ///
    /// `sleep` polls on a short real interval until enough virtual time has
    /// passed, letting concurrent logical actors observe the advance without
    /// the test driver needing a wakeup channel.
    #[derive(Debug)]
    pub struct DeterministicTimer {
        base: Instant,
        elapsed_nanos: AtomicU64,
    }

    impl Default for DeterministicTimer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DeterministicTimer {
        /// Create a new virtual clock starting at "time zero".
        pub fn new() -> Self {
            DeterministicTimer {
                base: Instant::now(),
                elapsed_nanos: AtomicU64::new(0),
            }
        }

        /// Move virtual time forward by `seconds`.
        pub fn advance(&self, seconds: f64) {
            let nanos = (seconds * 1_000_000_000.0).round() as u64;
            self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
        }

        fn elapsed(&self) -> Duration {
            Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl Timer for DeterministicTimer {
        fn now(&self) -> Instant {
            self.base + self.elapsed()
        }

        async fn sleep(&self, millis: u64) {
            let target = self.elapsed() + Duration::from_millis(millis);
            while self.elapsed() < target {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::deterministic::DeterministicTimer;
    use super::*;

    #[tokio::test]
    async fn test_real_timer_seconds_since() {
        let timer = RealTimer;
        let start = timer.now();
        timer.sleep(5).await;
        assert!(timer.seconds_since(start) >= 0.0);
    }

    #[tokio::test]
    async fn test_deterministic_timer_advance() {
        let timer = DeterministicTimer::new();
        let start = timer.now();
        timer.advance(6.0);
        assert!((timer.seconds_since(start) - 6.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_deterministic_sleep_blocks_until_advance() {
        let timer = std::sync::Arc::new(DeterministicTimer::new());
        let waiter = {
            let timer = timer.clone();
            tokio::spawn(async move {
                timer.sleep(2000).await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        timer.advance(2.0);
        waiter.await.unwrap();
    }
}
