//! Effect Implementation
//!
//! An effect is a side-effecting computation that re-runs whenever a cell it
//! read changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    its dependencies.
//!
//! 2. Each run pushes the effect's frame onto the tracking stack, calls the
//!    function, and pops the frame on every exit path (including a panic).
//!
//! 3. Any cell read during the run subscribes the effect. A later write that
//!    changes such a cell re-runs the effect synchronously, before the write
//!    returns.
//!
//! # Nesting
//!
//! An effect body may create further effects. The nested effect pushes its
//! own frame on top of the outer one, so reads inside the nested body
//! subscribe only the nested effect. Each run of the outer body creates a new
//! nested effect; earlier ones stay registered.
//!
//! # Failure
//!
//! A panic in the body propagates to whoever started the run: the caller of
//! [`effect`] for the first run, or the write that triggered a re-run.
//!
//! # Recursion
//!
//! An effect that writes a cell it reads re-triggers itself. Without a
//! [`max_depth`](super::RuntimeConfig::max_depth) this recurses until the
//! stack overflows; with one, the run that would exceed the limit panics with
//! [`ReactiveError::RecursionLimit`].

use std::rc::Rc;

use tracing::{debug, error, trace};

use super::config::SubscriptionPolicy;
use super::context::Frame;
use super::runtime::{Runtime, RuntimeInner};
use super::subscriber::{Computation, SubscriberId};
use crate::error::ReactiveError;

impl Runtime {
    /// Register `f` as an effect and run it once, now.
    ///
    /// No handle is returned: the effect lives as long as this runtime and
    /// re-runs on every change to a cell it read.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use ripple_core::reactive::Runtime;
    ///
    /// let runtime = Runtime::new();
    /// let count = runtime.signal(0);
    /// let seen = Rc::new(Cell::new(-1));
    ///
    /// let (c, s) = (count.clone(), seen.clone());
    /// runtime.effect(move || s.set(c.get()));
    /// assert_eq!(seen.get(), 0);
    ///
    /// count.set(5);
    /// assert_eq!(seen.get(), 5);
    /// ```
    pub fn effect<F>(&self, f: F)
    where
        F: Fn() + 'static,
    {
        let computation = Rc::new(Computation::new(f));
        debug!(subscriber = %computation.id(), "effect created");

        self.inner().register(computation.clone());
        self.inner().run(&computation);
    }

    /// Run `f` with tracking suspended: reads inside subscribe nothing.
    pub fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _frame = self.inner().context.enter(Frame::Untracked);
        f()
    }
}

/// Create an effect in the current thread's runtime.
///
/// See [`Runtime::effect`].
pub fn effect<F>(f: F)
where
    F: Fn() + 'static,
{
    Runtime::current().effect(f);
}

/// Run `f` without subscribing the active computation to anything it reads.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    Runtime::current().untracked(f)
}

impl RuntimeInner {
    /// Push, run, pop.
    pub(crate) fn run(&self, computation: &Computation) {
        if let Some(limit) = self.config.max_depth {
            if self.context.tracked_depth() >= limit {
                error!(subscriber = %computation.id(), limit, "effect recursion limit exceeded");
                std::panic::panic_any(ReactiveError::RecursionLimit { limit });
            }
        }

        if self.config.subscriptions == SubscriptionPolicy::Prune {
            for source in computation.take_sources() {
                if let Some(source) = source.upgrade() {
                    source.unsubscribe(computation.id());
                }
            }
        }

        let _frame = self.context.enter(Frame::Tracked(computation.id()));
        trace!(
            subscriber = %computation.id(),
            run = computation.runs() + 1,
            depth = self.context.depth(),
            "running effect"
        );
        computation.invoke();
    }

    /// Re-run a subscriber by id. Unknown ids are ignored.
    pub(crate) fn rerun(&self, subscriber: SubscriberId) {
        if let Some(computation) = self.computation(subscriber) {
            self.run(&computation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::RuntimeConfig;
    use std::cell::{Cell, RefCell};
    use std::panic::{self, AssertUnwindSafe};

    fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        (count.clone(), count)
    }

    #[test]
    fn effect_runs_on_creation() {
        let runtime = Runtime::new();
        let (runs, runs_clone) = counter();

        runtime.effect(move || runs_clone.set(runs_clone.get() + 1));

        // Effect should have run once on creation
        assert_eq!(runs.get(), 1);
        assert_eq!(runtime.effect_count(), 1);
    }

    #[test]
    fn effect_reruns_when_dependency_changes() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);
        let (runs, runs_clone) = counter();

        let s = signal.clone();
        runtime.effect(move || {
            s.get();
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        signal.set(1);
        assert_eq!(runs.get(), 2);

        signal.set(2);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn effect_without_reads_never_reruns() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);
        let (runs, runs_clone) = counter();

        runtime.effect(move || runs_clone.set(runs_clone.get() + 1));
        signal.set(1);

        assert_eq!(runs.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn untracked_reads_do_not_subscribe() {
        let runtime = Runtime::new();
        let tracked = runtime.signal(0);
        let hidden = runtime.signal(0);
        let (runs, runs_clone) = counter();

        let (t, h, rt) = (tracked.clone(), hidden.clone(), runtime.clone());
        runtime.effect(move || {
            t.get();
            rt.untracked(|| h.get());
            runs_clone.set(runs_clone.get() + 1);
        });

        hidden.set(1);
        assert_eq!(runs.get(), 1);
        tracked.set(1);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn panicking_body_restores_stack() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);

        let s = signal.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            runtime.effect(move || {
                if s.get() == 0 {
                    panic!("first run fails");
                }
            });
        }));

        assert!(result.is_err());
        assert!(!runtime.is_tracking());
        assert!(runtime.current_subscriber().is_none());

        // The subscription made before the panic still stands.
        assert_eq!(signal.subscriber_count(), 1);
        signal.set(1);
        assert!(!runtime.is_tracking());
    }

    #[test]
    fn rerun_failure_surfaces_through_write() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);

        let s = signal.clone();
        runtime.effect(move || {
            if s.get() == 3 {
                panic!("cannot handle three");
            }
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| signal.set(3)));
        assert!(result.is_err());
        assert!(!runtime.is_tracking());
        assert_eq!(signal.get_untracked(), 3);
    }

    #[test]
    fn recursion_limit_fails_fast() {
        let runtime = Runtime::with_config(RuntimeConfig::default().with_max_depth(16));
        let signal = runtime.signal(0);

        let s = signal.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            runtime.effect(move || {
                let v = s.get();
                s.set(v + 1);
            });
        }));

        let payload = result.unwrap_err();
        let err = payload.downcast_ref::<ReactiveError>().unwrap();
        assert!(matches!(err, ReactiveError::RecursionLimit { limit: 16 }));
        assert_eq!(runtime.inner().context.depth(), 0);
    }

    #[test]
    fn nested_effect_subscribes_inner_only() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        let (rt, s, o) = (runtime.clone(), signal.clone(), order.clone());
        runtime.effect(move || {
            o.borrow_mut().push("outer");
            let (s, o) = (s.clone(), o.clone());
            rt.effect(move || {
                s.get();
                o.borrow_mut().push("inner");
            });
        });
        assert_eq!(*order.borrow(), vec!["outer", "inner"]);

        signal.set(1);
        assert_eq!(*order.borrow(), vec!["outer", "inner", "inner"]);
        assert_eq!(runtime.effect_count(), 2);
    }
}
