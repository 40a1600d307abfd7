//! Runtime Tour Deterministic Sandbox and Demo Runner
//!
//! This crate provides the controlled environment in which concurrency
//! code can be tested without waiting on the real clock, plus the runner
//! that walks through every demonstration of the tour.
//!
//! # Core Principle: Virtual Time
//!
//! The clock is tokio's paused clock. It never moves on its own; it jumps
//! to the next timer deadline only when every task in the sandbox is idle.
//! On top of that, [`SandboxContext::wait`] blocks until every task spawned
//! through the context has finished or parked, so assertions run against
//! a settled state:
//!
//! ```text
//! body ─spawn─► task A ─sleep(1h)─► parked ┐
//!   │                                     │ all parked
//!   └─wait()──────────────────────────────┴─► returns (t = 0)
//!   └─sleep(2h)─► jump to 1h, A runs, jump to 2h ─► returns
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tour_sim::{DemoRunner, DemoConfig, DemoId};
//!
//! let runner = DemoRunner::new(DemoConfig::default());
//! let result = runner.run(DemoId::VirtualTime);
//! assert!(result.passed);
//! ```

mod context;
mod runner;
mod sandbox;
mod tracker;
pub mod scenarios;

pub use context::{SandboxContext, SANDBOX_EPOCH_SECS};
pub use runner::{DemoConfig, DemoError, DemoResult, DemoRunner, PERSON_INPUT};
pub use sandbox::Sandbox;
pub use scenarios::DemoId;
