//! Fixed-interval, non-overlapping task runner.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Counters reported by one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    /// Entities loaded for evaluation
    pub considered: usize,
    /// Alerts triggered or reports issued
    pub fired: usize,
    /// Messages accepted by the messenger
    pub delivered: usize,
    /// Entities skipped for lack of data or owner
    pub skipped: usize,
    /// Entities whose processing hit a persistence error
    pub failed: usize,
}

/// A unit of periodic work.
#[async_trait]
pub trait Cycle: Send + Sync {
    /// Task name used in logs.
    fn name(&self) -> &str;

    /// Run one cycle.
    ///
    /// # Returns
    /// `None` if the cycle was skipped because a previous one is still running.
    async fn run_cycle(&self) -> Option<CycleStats>;
}

/// Drives a [`Cycle`] on a fixed interval until shutdown.
///
/// Ticks that fall due while a cycle is still running are dropped, and a
/// cycle exceeding `cycle_timeout` is abandoned.
pub struct PeriodicTask {
    cycle: Arc<dyn Cycle>,
    interval: Duration,
    cycle_timeout: Duration,
}

impl PeriodicTask {
    pub fn new(cycle: Arc<dyn Cycle>, interval: Duration) -> Self {
        Self {
            cycle,
            interval,
            cycle_timeout: interval,
        }
    }

    pub fn with_cycle_timeout(mut self, cycle_timeout: Duration) -> Self {
        self.cycle_timeout = cycle_timeout;
        self
    }

    pub fn name(&self) -> &str {
        self.cycle.name()
    }

    /// Run until `shutdown` turns true or its sender is dropped.
    ///
    /// The first cycle starts immediately.
    ///
    /// # Returns
    /// Number of cycles that completed within their timeout.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
        let name = self.cycle.name().to_string();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut completed = 0;

        info!(task = %name, interval_secs = self.interval.as_secs(), "Task started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match tokio::time::timeout(self.cycle_timeout, self.cycle.run_cycle()).await {
                Ok(Some(stats)) => {
                    completed += 1;
                    debug!(task = %name, ?stats, "Cycle finished");
                }
                Ok(None) => debug!(task = %name, "Cycle skipped"),
                Err(_) => warn!(
                    task = %name,
                    timeout_secs = self.cycle_timeout.as_secs(),
                    "Cycle exceeded its time limit and was abandoned"
                ),
            }
        }

        info!(task = %name, completed, "Task stopped");
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        runs: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl Cycle for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn run_cycle(&self) -> Option<CycleStats> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Some(CycleStats::default())
        }
    }

    fn counting(delay: Duration) -> Arc<Counting> {
        Arc::new(Counting {
            runs: AtomicUsize::new(0),
            delay,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_on_interval_until_shutdown() {
        let cycle = counting(Duration::ZERO);
        let (tx, rx) = watch::channel(false);
        let task = PeriodicTask::new(cycle.clone(), Duration::from_secs(60));
        let handle = tokio::spawn(task.run(rx));

        tokio::time::sleep(Duration::from_secs(150)).await;
        tx.send(true).unwrap();
        let completed = handle.await.unwrap();

        // Ticks at 0s, 60s and 120s.
        assert_eq!(completed, 3);
        assert_eq!(cycle.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycle_is_abandoned() {
        let cycle = counting(Duration::from_secs(600));
        let (tx, rx) = watch::channel(false);
        let task = PeriodicTask::new(cycle.clone(), Duration::from_secs(60))
            .with_cycle_timeout(Duration::from_secs(30));
        let handle = tokio::spawn(task.run(rx));

        tokio::time::sleep(Duration::from_secs(100)).await;
        drop(tx);
        let completed = handle.await.unwrap();

        assert_eq!(completed, 0);
        assert_eq!(cycle.runs.load(Ordering::SeqCst), 2);
    }
}
