// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Call depth tracking
//!
//! Counts the profiled calls currently active on the calling thread. Entering
//! returns a [`DepthGuard`]; the counter is decremented when the guard is
//! dropped, so every exit path (return, `Err`, panic) balances the entry.
//!
//! ```rust
//! use timing_aspect::CallDepthTracker;
//!
//! let outer = CallDepthTracker::enter();
//! assert_eq!(outer.depth(), 1);
//! {
//!     let inner = CallDepthTracker::enter();
//!     assert_eq!(inner.depth(), 2);
//! }
//! assert_eq!(CallDepthTracker::current(), 1);
//! outer.exit();
//! assert_eq!(CallDepthTracker::current(), 0);
//! ```
//!
//! With the `async` feature, futures timed through the async engine keep
//! their depth in a tokio task-local instead, so the count follows the task
//! across worker threads. The outermost timed future establishes the scope;
//! tasks spawned from inside it start a fresh count.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    /// Active profiled calls on this thread
    static DEPTH: Cell<u64> = const { Cell::new(0) };
}

#[cfg(feature = "async")]
tokio::task_local! {
    /// Active profiled calls in this task
    static TASK_DEPTH: Cell<u64>;
}

/// Per-thread counter of active profiled calls
pub struct CallDepthTracker;

impl CallDepthTracker {
    /// Increment the counter and return a guard holding the new depth
    ///
    /// The outermost call on a thread sees depth 1.
    pub fn enter() -> DepthGuard {
        let depth = DEPTH.with(|d| {
            let next = d.get().saturating_add(1);
            d.set(next);
            next
        });

        DepthGuard {
            depth,
            _not_send: PhantomData,
        }
    }

    /// Number of active profiled calls on this thread
    pub fn current() -> u64 {
        DEPTH.with(Cell::get)
    }

    /// Number of active profiled calls in the current task, if a timed future
    /// is running
    #[cfg(feature = "async")]
    pub fn current_task() -> Option<u64> {
        TASK_DEPTH.try_with(Cell::get).ok()
    }

    #[cfg(feature = "async")]
    pub(crate) fn in_task_scope() -> bool {
        TASK_DEPTH.try_with(|_| ()).is_ok()
    }

    /// Run `future` with a fresh task-local counter
    #[cfg(feature = "async")]
    pub(crate) async fn task_scope<F: std::future::Future>(future: F) -> F::Output {
        TASK_DEPTH.scope(Cell::new(0), future).await
    }

    /// Task-local counterpart of [`enter`](Self::enter)
    ///
    /// Outside a task scope there is nothing to count and depth 1 is reported.
    #[cfg(feature = "async")]
    pub(crate) fn enter_task() -> TaskDepthGuard {
        let depth = TASK_DEPTH.try_with(|d| {
            let next = d.get().saturating_add(1);
            d.set(next);
            next
        });

        match depth {
            Ok(depth) => TaskDepthGuard {
                depth,
                scoped: true,
            },
            Err(_) => TaskDepthGuard {
                depth: 1,
                scoped: false,
            },
        }
    }
}

/// Scoped membership in the thread's call depth
///
/// Not `Send`: the guard must be released on the thread that entered.
#[derive(Debug)]
#[must_use = "dropping the guard immediately exits the call"]
pub struct DepthGuard {
    depth: u64,
    _not_send: PhantomData<*const ()>,
}

impl DepthGuard {
    /// Depth of the call this guard belongs to
    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// Leave the call explicitly
    pub fn exit(self) {}
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Task-local counterpart of [`DepthGuard`]
#[cfg(feature = "async")]
#[derive(Debug)]
pub(crate) struct TaskDepthGuard {
    depth: u64,
    scoped: bool,
}

#[cfg(feature = "async")]
impl TaskDepthGuard {
    pub(crate) fn depth(&self) -> u64 {
        self.depth
    }
}

#[cfg(feature = "async")]
impl Drop for TaskDepthGuard {
    fn drop(&mut self) {
        if self.scoped {
            let _ = TASK_DEPTH.try_with(|d| d.set(d.get().saturating_sub(1)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::thread;

    #[test]
    fn test_outermost_depth_is_one() {
        let guard = CallDepthTracker::enter();
        assert_eq!(guard.depth(), 1);
        guard.exit();
        assert_eq!(CallDepthTracker::current(), 0);
    }

    #[test]
    fn test_nested_enters() {
        fn recurse(remaining: u64, seen: &mut Vec<u64>) {
            let guard = CallDepthTracker::enter();
            seen.push(guard.depth());
            if remaining > 1 {
                recurse(remaining - 1, seen);
            }
        }

        let mut seen = Vec::new();
        recurse(5, &mut seen);

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(CallDepthTracker::current(), 0);
    }

    #[test]
    fn test_panic_releases_depth() {
        let result = panic::catch_unwind(|| {
            let _guard = CallDepthTracker::enter();
            panic!("boom");
        });

        assert!(result.is_err());
        assert_eq!(CallDepthTracker::current(), 0);
    }

    #[test]
    fn test_threads_are_independent() {
        let _outer = CallDepthTracker::enter();

        let other = thread::spawn(|| {
            let guard = CallDepthTracker::enter();
            guard.depth()
        })
        .join()
        .unwrap();

        assert_eq!(other, 1);
        assert_eq!(CallDepthTracker::current(), 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_task_scope_counts_nested_entries() {
        assert_eq!(CallDepthTracker::current_task(), None);

        CallDepthTracker::task_scope(async {
            let outer = CallDepthTracker::enter_task();
            assert_eq!(outer.depth(), 1);
            {
                let inner = CallDepthTracker::enter_task();
                assert_eq!(inner.depth(), 2);
            }
            assert_eq!(CallDepthTracker::current_task(), Some(1));
        })
        .await;
    }

    #[cfg(feature = "async")]
    #[test]
    fn test_enter_task_outside_scope() {
        let guard = CallDepthTracker::enter_task();
        assert_eq!(guard.depth(), 1);
    }
}
