//! Sandbox - runs a test body on a virtual clock.

use crate::context::SandboxContext;
use std::future::Future;
use std::time::{Duration, SystemTime};
use tour_env::EnvError;
use tracing::debug;

/// Runs bodies inside a fresh single-threaded runtime whose clock starts
/// paused. Sleeps resolve as soon as every task is idle, so a body that
/// sleeps for hours finishes in microseconds of wall-clock time.
///
/// # Usage
///
/// ```
/// use std::time::Duration;
/// use tour_env::TourContext;
/// use tour_sim::Sandbox;
///
/// let slept = Sandbox::new()
///     .run(|ctx| async move {
///         ctx.sleep(Duration::from_secs(3600)).await;
///         ctx.now()
///     })
///     .unwrap();
/// assert!(slept >= Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct Sandbox {
    /// Virtual time allowed for spawned tasks to finish after the body
    drain_limit: Duration,

    /// Wall-clock time of virtual time 0
    epoch: SystemTime,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            drain_limit: Duration::from_secs(3600),
            epoch: SandboxContext::default_epoch(),
        }
    }

    /// Sets the virtual drain limit.
    pub fn with_drain_limit(mut self, limit: Duration) -> Self {
        self.drain_limit = limit;
        self
    }

    /// Sets the wall-clock time of virtual time 0.
    pub fn with_epoch(mut self, epoch: SystemTime) -> Self {
        self.epoch = epoch;
        self
    }

    /// Runs `body` in the sandbox, then joins every task it spawned.
    ///
    /// Returns `EnvError::Deadlock` naming tasks still blocked once the
    /// drain limit of virtual time has passed, and `EnvError::TaskFailed`
    /// if a spawned task panicked.
    pub fn run<F, Fut, T>(&self, body: F) -> Result<T, EnvError>
    where
        F: FnOnce(SandboxContext) -> Fut,
        Fut: Future<Output = T>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .map_err(EnvError::runtime)?;

        let epoch = self.epoch;
        let drain_limit = self.drain_limit;
        runtime.block_on(async move {
            let ctx = SandboxContext::new(epoch);
            let output = body(ctx.clone()).await;
            debug!(running = ctx.running(), "sandbox body finished; draining");
            ctx.drain(drain_limit).await?;
            Ok(output)
        })
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
