//! Expiration Janitor
//!
//! Background task that periodically sweeps expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};

/// Something the janitor can sweep.
///
/// Implemented by the cache's shared state; the janitor only ever holds a
/// `Weak` reference to it.
pub(crate) trait Sweep: Send + Sync + 'static {
    /// Removes every expired entry, returning how many were removed.
    fn sweep(&self) -> usize;
}

/// Lifecycle of the background sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JanitorState {
    /// No usable sweep interval was configured; no task ever runs
    Disabled,
    /// The periodic task is running
    Running,
    /// Stop requested; the task exits after any sweep in progress.
    /// Terminal
    Stopped,
}

struct Worker {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owner of the background sweep task.
///
/// Stopping is one-shot: the first call moves the janitor to its terminal
/// state, every later call returns [`CacheError::AlreadyStopped`].
pub(crate) struct Janitor {
    worker: Option<Worker>,
    enabled: bool,
    stopped: bool,
}

impl Janitor {
    /// A janitor that never runs.
    pub(crate) fn disabled() -> Self {
        Self {
            worker: None,
            enabled: false,
            stopped: false,
        }
    }

    /// Spawns the sweep loop on the current Tokio runtime.
    ///
    /// The first sweep runs one `interval` after spawning. The loop exits
    /// when stopped or once `target` has been dropped.
    ///
    /// An interval too large to schedule yields a disabled janitor.
    ///
    /// # Errors
    /// [`CacheError::RuntimeUnavailable`] when called outside a runtime.
    pub(crate) fn spawn<S: Sweep>(target: Weak<S>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Ok(Self::disabled());
        }
        let runtime =
            Handle::try_current().map_err(|e| CacheError::RuntimeUnavailable(e.to_string()))?;
        // Two periods must fit: the first deadline and the one after it
        let Some(start) = first_tick(Instant::now(), interval) else {
            warn!(
                "Sweep interval {:?} is too large to schedule, sweep disabled",
                interval
            );
            return Ok(Self::disabled());
        };
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = runtime.spawn(run(target, start, interval, stop_rx));

        Ok(Self {
            worker: Some(Worker { stop_tx, handle }),
            enabled: true,
            stopped: false,
        })
    }

    pub(crate) fn state(&self) -> JanitorState {
        if !self.enabled {
            JanitorState::Disabled
        } else if self.stopped {
            JanitorState::Stopped
        } else {
            JanitorState::Running
        }
    }

    /// Signals the task to exit after any sweep in progress.
    ///
    /// A disabled janitor stays `Disabled`, but still accepts only one stop.
    ///
    /// Returns the task's handle so callers can wait for it to finish;
    /// `None` if the janitor was never running.
    pub(crate) fn stop(&mut self) -> Result<Option<JoinHandle<()>>> {
        if self.stopped {
            return Err(CacheError::AlreadyStopped);
        }
        self.stopped = true;

        Ok(self.worker.take().map(|worker| {
            // The receiver is gone only if the task already exited
            let _ = worker.stop_tx.send(());
            worker.handle
        }))
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
        }
    }
}

/// Deadline of the first sweep, or None if the schedule would overflow.
fn first_tick(now: Instant, period: Duration) -> Option<Instant> {
    let start = now.checked_add(period)?;
    start.checked_add(period)?;
    Some(start)
}

async fn run<S: Sweep>(
    target: Weak<S>,
    start: Instant,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    info!("Starting expiration sweep with interval of {:?}", period);

    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            // Resolves on an explicit stop or when the sender is dropped
            _ = &mut stop_rx => {
                info!("Expiration sweep stopped");
                break;
            }
            _ = ticker.tick() => {
                let Some(cache) = target.upgrade() else {
                    debug!("Cache dropped, expiration sweep exiting");
                    break;
                };
                let removed = cache.sweep();
                if removed > 0 {
                    info!("Expiration sweep: removed {} expired entries", removed);
                } else {
                    debug!("Expiration sweep: no expired entries found");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingSweep {
        calls: AtomicUsize,
    }

    impl Sweep for CountingSweep {
        fn sweep(&self) -> usize {
            self.calls.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let target = Arc::new(CountingSweep::default());

        let result = Janitor::spawn(Arc::downgrade(&target), Duration::from_millis(10));

        assert!(matches!(result, Err(CacheError::RuntimeUnavailable(_))));
    }

    #[test]
    fn test_zero_interval_is_disabled() {
        let target = Arc::new(CountingSweep::default());

        let janitor = Janitor::spawn(Arc::downgrade(&target), Duration::ZERO).unwrap();

        assert_eq!(janitor.state(), JanitorState::Disabled);
    }

    #[tokio::test]
    async fn test_oversized_interval_is_disabled() {
        let target = Arc::new(CountingSweep::default());

        let mut janitor = Janitor::spawn(Arc::downgrade(&target), Duration::MAX).unwrap();
        assert_eq!(janitor.state(), JanitorState::Disabled);
        assert!(janitor.worker.is_none());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(janitor.state(), JanitorState::Disabled);
        assert!(janitor.stop().unwrap().is_none());
    }

    #[test]
    fn test_first_tick_overflow() {
        let now = Instant::now();

        assert_eq!(
            first_tick(now, Duration::from_secs(1)),
            Some(now + Duration::from_secs(1))
        );
        assert_eq!(first_tick(now, Duration::MAX), None);
        assert_eq!(first_tick(now, Duration::MAX / 2 + Duration::from_secs(1)), None);
    }

    #[tokio::test]
    async fn test_janitor_sweeps_periodically() {
        let target = Arc::new(CountingSweep::default());

        let mut janitor = Janitor::spawn(Arc::downgrade(&target), Duration::from_millis(10)).unwrap();
        assert_eq!(janitor.state(), JanitorState::Running);

        tokio::time::sleep(Duration::from_millis(55)).await;

        assert!(target.calls.load(Ordering::SeqCst) >= 2);
        janitor.stop().unwrap();
    }

    #[tokio::test]
    async fn test_stop_terminates_task() {
        let target = Arc::new(CountingSweep::default());
        let mut janitor = Janitor::spawn(Arc::downgrade(&target), Duration::from_millis(10)).unwrap();

        let handle = janitor.stop().unwrap().expect("janitor was running");
        handle.await.unwrap();

        assert_eq!(janitor.state(), JanitorState::Stopped);
        let calls = target.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_second_stop_is_an_error() {
        let target = Arc::new(CountingSweep::default());
        let mut janitor = Janitor::spawn(Arc::downgrade(&target), Duration::from_millis(10)).unwrap();

        assert!(janitor.stop().is_ok());
        assert_eq!(janitor.stop().unwrap_err(), CacheError::AlreadyStopped);
    }

    #[test]
    fn test_stop_disabled_janitor_once() {
        let mut janitor = Janitor::disabled();

        assert!(janitor.stop().unwrap().is_none());
        assert_eq!(janitor.state(), JanitorState::Disabled);
        assert_eq!(janitor.stop().unwrap_err(), CacheError::AlreadyStopped);
    }

    #[tokio::test]
    async fn test_task_exits_when_target_dropped() {
        let target = Arc::new(CountingSweep::default());
        let mut janitor = Janitor::spawn(Arc::downgrade(&target), Duration::from_millis(5)).unwrap();
        let Worker {
            stop_tx: _stop_tx,
            handle,
        } = janitor.worker.take().unwrap();

        drop(target);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task should exit once the target is gone")
            .unwrap();
    }
}
