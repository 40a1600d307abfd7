//! Fire-and-forget task group with automatic completion signaling.
//!
//! Every unit spawned through [`TaskGroup::go`] carries a [`Completion`]
//! guard. The guard is released when the unit's thread drops it, which
//! happens on a normal return and while unwinding from a panic alike, so
//! the group can never be left waiting on a unit that forgot to signal.

use crate::EnvError;
use crossbeam::sync::WaitGroup;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Counters {
    pending: AtomicUsize,
    panicked: AtomicUsize,
}

/// Release obligation owned by one spawned unit.
struct Completion {
    name: String,
    counters: Arc<Counters>,
    // Dropped after `Drop::drop` runs, which releases the group.
    _token: WaitGroup,
}

impl Drop for Completion {
    fn drop(&mut self) {
        if thread::panicking() {
            self.counters.panicked.fetch_add(1, Ordering::SeqCst);
            warn!(unit = %self.name, "task group unit panicked");
        }
        self.counters.pending.fetch_sub(1, Ordering::SeqCst);
        debug!(unit = %self.name, "task group unit released");
    }
}

/// A set of OS-thread units that are waited on jointly.
///
/// # Example
///
/// ```
/// use tour_env::TaskGroup;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let group = TaskGroup::new();
/// for i in 0..3 {
///     let hits = hits.clone();
///     group.go(&format!("worker-{i}"), move || {
///         hits.fetch_add(1, Ordering::SeqCst);
///     }).unwrap();
/// }
/// group.wait().unwrap();
/// assert_eq!(hits.load(Ordering::SeqCst), 3);
/// ```
pub struct TaskGroup {
    token: WaitGroup,
    counters: Arc<Counters>,
}

impl TaskGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            token: WaitGroup::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Spawns `f` on a named thread and registers it with the group.
    ///
    /// If the thread cannot be started, the registration is undone before
    /// the error is returned.
    pub fn go<F>(&self, name: &str, f: F) -> Result<(), EnvError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let completion = Completion {
            name: name.to_string(),
            counters: Arc::clone(&self.counters),
            _token: self.token.clone(),
        };

        debug!(unit = name, "task group unit spawned");
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _completion = completion;
                f();
            })
            .map_err(EnvError::spawn)?;

        Ok(())
    }

    /// Number of spawned units that have not released yet.
    pub fn pending(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    /// Blocks until every spawned unit has released.
    ///
    /// Returns `EnvError::TaskPanicked` if any unit panicked; the remaining
    /// units have still run to completion by then.
    pub fn wait(self) -> Result<(), EnvError> {
        let counters = self.counters;
        self.token.wait();

        match counters.panicked.load(Ordering::SeqCst) {
            0 => Ok(()),
            count => Err(EnvError::TaskPanicked { count }),
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn test_wait_sees_every_unit() {
        let hits = Arc::new(AtomicUsize::new(0));
        let group = TaskGroup::new();

        for i in 0..3 {
            let hits = hits.clone();
            group
                .go(&format!("unit-{i}"), move || {
                    thread::sleep(Duration::from_millis(5));
                    hits.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        group.wait().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_group_returns_immediately() {
        let group = TaskGroup::new();
        assert_eq!(group.pending(), 0);
        group.wait().unwrap();
    }

    #[test]
    fn test_panicking_unit_still_releases() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let group = TaskGroup::new();

        group.go("boom", || panic!("unit failed")).unwrap();
        for name in ["a", "b"] {
            let finished = finished.clone();
            group
                .go(name, move || finished.lock().unwrap().push(name))
                .unwrap();
        }

        let result = group.wait();
        assert!(matches!(result, Err(EnvError::TaskPanicked { count: 1 })));

        let mut finished = finished.lock().unwrap().clone();
        finished.sort();
        assert_eq!(finished, vec!["a", "b"]);
    }

    #[test]
    fn test_pending_drops_to_zero() {
        let group = TaskGroup::new();
        let (tx, rx) = std::sync::mpsc::channel::<()>();

        group
            .go("blocked", move || {
                let _ = rx.recv();
            })
            .unwrap();
        assert_eq!(group.pending(), 1);

        tx.send(()).unwrap();
        let counters = Arc::clone(&group.counters);
        group.wait().unwrap();
        assert_eq!(counters.pending.load(Ordering::SeqCst), 0);
    }
}
