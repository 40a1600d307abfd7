//! Runtime Tour Environment Abstraction Layer
//!
//! This crate provides the seam that lets the tour's demonstrations run
//! against **real** time (tokio) or **virtual** time (the sandbox in
//! `tour_sim`) without changing the code under test.
//!
//! # What is abstracted
//!
//! - Time (`now()`, `system_time()`, `sleep()`)
//! - Task spawning (`spawn()`)
//!
//! Plus one environment-independent primitive, [`TaskGroup`], for joining a
//! small fixed set of OS-thread units with automatic completion signaling.
//!
//! # Example
//!
//! ```ignore
//! use tour_env::TourContext;
//!
//! async fn heartbeat<Ctx: TourContext>(ctx: &Ctx) {
//!     loop {
//!         ctx.sleep(Duration::from_secs(1)).await;
//!         tick(ctx.now());
//!     }
//! }
//! ```

mod context;
mod error;
mod group;
mod tokio_impl;

pub use context::TourContext;
pub use error::EnvError;
pub use group::TaskGroup;
pub use tokio_impl::TokioContext;
