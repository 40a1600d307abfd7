//! Core environment context trait for tour demonstrations.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, SystemTime};

/// The central interface for time and task interaction.
///
/// This trait abstracts the clock and the task spawner so that the same
/// code can run against real time (tokio) and inside the virtual-time
/// sandbox used by deterministic tests.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time` and `tokio::spawn`
/// - **Sandbox**: `SandboxContext` (in `tour_sim`) - paused tokio clock,
///   tracked tasks, quiescence wait
#[async_trait]
pub trait TourContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// In the sandbox, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time.
    ///
    /// In the sandbox, this is a fixed epoch plus the virtual clock.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In the sandbox: resolves as soon as every other task is idle
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task owned by this context.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Returns true if time is simulated.
    fn is_virtual(&self) -> bool;
}
