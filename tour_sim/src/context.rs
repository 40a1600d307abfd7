//! Sandbox context implementing TourContext on a paused clock.

use crate::tracker::{self, Registry};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tokio::time::Instant;
use tour_env::{EnvError, TourContext};
use tracing::{debug, warn};

/// Virtual time 0 maps to this wall-clock time: 2024-01-01 00:00:00 UTC.
pub const SANDBOX_EPOCH_SECS: u64 = 1704067200;

/// Yields between quiescence checks before the wait starts warning.
const SPIN_WARN_INTERVAL: u64 = 100_000;

/// Longest virtual step taken while draining untracked tasks.
const UNTRACKED_POLL_MAX: Duration = Duration::from_secs(1);

/// Context handed to a sandbox body.
///
/// This implements `TourContext` using:
/// - tokio's paused clock, which jumps to the next timer only when every
///   task on the sandbox runtime is idle
/// - a fixed epoch for `system_time()`
/// - tracked spawning, so [`SandboxContext::wait`] can tell when all
///   spawned tasks are parked
///
/// Must be used from inside [`crate::Sandbox::run`].
#[derive(Clone)]
pub struct SandboxContext {
    /// Runtime that owns every spawned task
    handle: Handle,

    /// Virtual time at sandbox start
    start: Instant,

    /// Wall-clock time of virtual time 0
    epoch: SystemTime,

    registry: Arc<Registry>,
}

impl SandboxContext {
    /// Creates a context on the current (paused) runtime.
    pub(crate) fn new(epoch: SystemTime) -> Self {
        Self {
            handle: Handle::current(),
            start: Instant::now(),
            epoch,
            registry: Arc::new(Registry::default()),
        }
    }

    /// Default epoch for sandbox contexts.
    pub fn default_epoch() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(SANDBOX_EPOCH_SECS)
    }

    /// Blocks until every task spawned through this context is finished or
    /// parked with no wake pending, and every other task on the sandbox
    /// runtime has exited. Does not advance virtual time.
    ///
    /// Parking is only observable for tasks spawned through the context; a
    /// task started with `tokio::spawn` must run to completion before this
    /// returns. A task that never parks (busy loop, endless yields) keeps
    /// this from ever returning.
    pub async fn wait(&self) {
        let mut spins: u64 = 0;
        while !self.registry.is_quiescent() || self.untracked() > 0 {
            spins += 1;
            if spins % SPIN_WARN_INTERVAL == 0 {
                warn!(
                    spins,
                    running = self.registry.running(),
                    untracked = self.untracked(),
                    "sandbox not quiescent yet; is a task busy-looping?"
                );
            }
            tokio::task::yield_now().await;
        }
    }

    /// Yields until every tracked task is finished or parked.
    async fn settle_tracked(&self) {
        while !self.registry.is_quiescent() {
            tokio::task::yield_now().await;
        }
    }

    /// Live tasks on the sandbox runtime that were not spawned through a
    /// context (plain `tokio::spawn`).
    fn untracked(&self) -> usize {
        let alive = self.handle.metrics().num_alive_tasks();
        alive.saturating_sub(self.registry.running())
    }

    /// Number of spawned tasks that have not finished.
    pub fn running(&self) -> usize {
        self.registry.running()
    }

    /// Joins every spawned task, letting virtual time run for at most
    /// `limit`. Tasks spawned while draining are joined too. Untracked
    /// tasks cannot be joined; they are given until the same deadline to
    /// exit.
    pub(crate) async fn drain(&self, limit: Duration) -> Result<(), EnvError> {
        let deadline = Instant::now() + limit;
        let mut blocked = Vec::new();

        loop {
            self.settle_tracked().await;
            let pending = self.registry.take_handles();
            if pending.is_empty() {
                break;
            }

            for (name, mut handle) in pending {
                match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(Ok(())) => debug!(task = %name, "sandbox task joined"),
                    Ok(Err(err)) if err.is_panic() => {
                        return Err(EnvError::TaskFailed { name });
                    }
                    Ok(Err(_)) => debug!(task = %name, "sandbox task cancelled"),
                    Err(_) => {
                        warn!(task = %name, "sandbox task still blocked at drain limit");
                        handle.abort();
                        blocked.push(name);
                    }
                }
            }
        }

        if !blocked.is_empty() {
            return Err(EnvError::Deadlock { blocked });
        }

        let mut step = Duration::from_millis(1);
        loop {
            let count = self.untracked();
            if count == 0 {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(count, "untracked tasks still alive at drain limit");
                return Err(EnvError::Untracked { count });
            }
            tokio::time::sleep(step.min(deadline - now)).await;
            step = (step * 2).min(UNTRACKED_POLL_MAX);
        }
    }
}

#[async_trait]
impl TourContext for SandboxContext {
    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.start)
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        debug!(task = name, "sandbox spawn");
        let (state, tracked) = tracker::track(name, future);
        let handle = self.handle.spawn(tracked);
        self.registry.attach(state, handle);
    }

    fn is_virtual(&self) -> bool {
        true
    }
}
