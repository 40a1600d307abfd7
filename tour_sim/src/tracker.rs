//! Quiescence tracking for tasks spawned inside the sandbox.
//!
//! Every tracked task is polled through a waker of our own. A task is
//! *runnable* from spawn until a poll returns `Pending`, and becomes
//! runnable again whenever anything wakes it. The sandbox is quiescent when
//! every tracked task is either finished or parked with no wake pending.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Wake, Waker};
use tokio::task::JoinHandle;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scheduling state of one tracked task.
pub(crate) struct TaskState {
    name: String,
    runnable: AtomicBool,
    finished: AtomicBool,
    /// Waker handed to us by the runtime on the latest poll
    outer: Mutex<Option<Waker>>,
}

impl TaskState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            runnable: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            outer: Mutex::new(None),
        }
    }

    fn is_quiescent(&self) -> bool {
        self.finished.load(Ordering::SeqCst) || !self.runnable.load(Ordering::SeqCst)
    }
}

impl Wake for TaskState {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.runnable.store(true, Ordering::SeqCst);
        let outer = lock(&self.outer).clone();
        if let Some(waker) = outer {
            waker.wake();
        }
    }
}

/// Future wrapper that keeps a [`TaskState`] current.
pub(crate) struct Tracked<F> {
    inner: Pin<Box<F>>,
    state: Arc<TaskState>,
}

impl<F: Future<Output = ()>> Future for Tracked<F> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = &mut *self;
        *lock(&this.state.outer) = Some(cx.waker().clone());
        // Cleared before polling so a wake during the poll is not lost.
        this.state.runnable.store(false, Ordering::SeqCst);

        let waker = Waker::from(Arc::clone(&this.state));
        let mut inner_cx = Context::from_waker(&waker);
        let poll = this.inner.as_mut().poll(&mut inner_cx);

        if poll.is_ready() {
            this.state.finished.store(true, Ordering::SeqCst);
        }
        poll
    }
}

// A task aborted or unwound by a panic never returns `Ready`.
impl<F> Drop for Tracked<F> {
    fn drop(&mut self) {
        self.state.finished.store(true, Ordering::SeqCst);
    }
}

struct Entry {
    state: Arc<TaskState>,
    handle: Option<JoinHandle<()>>,
}

/// All tasks spawned through one sandbox.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<Vec<Entry>>,
}

/// Wraps `future` for tracking. Hand the returned state to
/// [`Registry::attach`] once the task is spawned.
pub(crate) fn track<F>(name: &str, future: F) -> (Arc<TaskState>, Tracked<F>)
where
    F: Future<Output = ()>,
{
    let state = Arc::new(TaskState::new(name));
    let tracked = Tracked {
        inner: Box::pin(future),
        state: Arc::clone(&state),
    };
    (state, tracked)
}

impl Registry {
    pub fn attach(&self, state: Arc<TaskState>, handle: JoinHandle<()>) {
        lock(&self.entries).push(Entry {
            state,
            handle: Some(handle),
        });
    }

    pub fn is_quiescent(&self) -> bool {
        lock(&self.entries).iter().all(|entry| entry.state.is_quiescent())
    }

    /// Tracked tasks that have neither finished nor been dropped.
    pub fn running(&self) -> usize {
        lock(&self.entries)
            .iter()
            .filter(|entry| !entry.state.finished.load(Ordering::SeqCst))
            .count()
    }

    /// Takes the join handles not yet taken, with their task names.
    pub fn take_handles(&self) -> Vec<(String, JoinHandle<()>)> {
        lock(&self.entries)
            .iter_mut()
            .filter_map(|entry| {
                let handle = entry.handle.take()?;
                Some((entry.state.name.clone(), handle))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn noop_waker() -> Waker {
        struct Noop;
        impl Wake for Noop {
            fn wake(self: Arc<Self>) {}
        }
        Waker::from(Arc::new(Noop))
    }

    /// Pending on the first poll, ready on the second; wakes itself in between.
    struct TwoStep {
        polls: Arc<AtomicUsize>,
        wake_self: bool,
    }

    impl Future for TwoStep {
        type Output = ();

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.polls.fetch_add(1, Ordering::SeqCst) == 0 {
                if self.wake_self {
                    cx.waker().wake_by_ref();
                }
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        }
    }

    #[test]
    fn test_state_transitions() {
        let polls = Arc::new(AtomicUsize::new(0));
        let (state, mut tracked) = track(
            "two-step",
            TwoStep { polls: polls.clone(), wake_self: false },
        );

        // Not yet polled: runnable.
        assert!(!state.is_quiescent());

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(Pin::new(&mut tracked).poll(&mut cx).is_pending());
        assert!(state.is_quiescent());

        Waker::from(Arc::clone(&state)).wake();
        assert!(!state.is_quiescent());

        assert!(Pin::new(&mut tracked).poll(&mut cx).is_ready());
        assert!(state.is_quiescent());
        assert!(state.finished.load(Ordering::SeqCst));
    }

    #[test]
    fn test_wake_during_poll_keeps_task_runnable() {
        let (state, mut tracked) = track(
            "self-waking",
            TwoStep { polls: Arc::new(AtomicUsize::new(0)), wake_self: true },
        );

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(Pin::new(&mut tracked).poll(&mut cx).is_pending());
        assert!(!state.is_quiescent());
    }

    #[test]
    fn test_dropped_task_counts_as_finished() {
        let registry = Registry::default();
        let (state, tracked) = track(
            "aborted",
            TwoStep { polls: Arc::new(AtomicUsize::new(0)), wake_self: false },
        );
        registry.entries.lock().unwrap().push(Entry { state: Arc::clone(&state), handle: None });
        assert_eq!(registry.running(), 1);

        drop(tracked);
        assert_eq!(registry.running(), 0);
        assert!(state.is_quiescent());
    }
}
