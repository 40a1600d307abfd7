//! Error types for the environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The OS refused to start a worker thread
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// One or more task group units panicked before releasing
    #[error("{count} task(s) panicked")]
    TaskPanicked { count: usize },

    /// A spawned sandbox task terminated abnormally
    #[error("Task '{name}' failed")]
    TaskFailed { name: String },

    /// Spawned tasks were still blocked when the sandbox drained
    #[error("Deadlock: tasks still blocked after drain: {}", blocked.join(", "))]
    Deadlock { blocked: Vec<String> },

    /// Tasks started outside the sandbox context outlived the drain
    #[error("{count} untracked task(s) still alive after drain")]
    Untracked { count: usize },

    /// Runtime could not be constructed
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl EnvError {
    /// Creates a spawn error.
    pub fn spawn(err: impl std::fmt::Display) -> Self {
        Self::Spawn(err.to_string())
    }

    /// Creates a runtime error.
    pub fn runtime(err: impl std::fmt::Display) -> Self {
        Self::Runtime(err.to_string())
    }
}
