//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects cells and effects.
//! It owns the tracking stack and the registry of computations, and it is the
//! unit of isolation: cells and effects created through one runtime never
//! observe another runtime's computations.
//!
//! # How It Works
//!
//! 1. `effect(f)` registers a computation under a fresh
//!    [`SubscriberId`] and runs it immediately with its frame pushed.
//!
//! 2. A cell read while a frame is active adds that id to the cell's
//!    subscriber set.
//!
//! 3. A value-changing write snapshots the cell's subscribers and asks the
//!    runtime to re-run each id, in subscription order, before returning.
//!
//! # Ownership
//!
//! The runtime holds computations strongly; cells only hold a weak handle to
//! the runtime. Dropping the last [`Runtime`] handle drops every effect it
//! owns. Cells outliving their runtime keep working as plain values: reads
//! subscribe nothing and writes notify nobody.
//!
//! # Threading
//!
//! A runtime is single-threaded (`!Send`). The free functions in this module
//! ([`signal`](super::signal()), [`state`](super::state()),
//! [`effect`](super::effect()), [`untracked`](super::untracked())) use a
//! per-thread default runtime, see [`Runtime::current`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::config::RuntimeConfig;
use super::context::TrackingContext;
use super::subscriber::{Computation, SubscriberId};

thread_local! {
    static CURRENT: Runtime = Runtime::new();
}

/// Handle to a reactive universe. Cloning shares the same universe.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

pub(crate) struct RuntimeInner {
    pub(super) config: RuntimeConfig,
    pub(super) context: TrackingContext,
    computations: RefCell<HashMap<SubscriberId, Rc<Computation>>>,
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                context: TrackingContext::new(),
                computations: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The calling thread's default runtime.
    pub fn current() -> Self {
        CURRENT.with(Runtime::clone)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The computation reads would currently subscribe, if any.
    pub fn current_subscriber(&self) -> Option<SubscriberId> {
        self.inner.context.peek()
    }

    /// Check if we're inside a tracked computation.
    pub fn is_tracking(&self) -> bool {
        self.inner.context.is_active()
    }

    /// Number of effects registered in this runtime.
    pub fn effect_count(&self) -> usize {
        self.inner.computations.borrow().len()
    }

    /// True if both handles refer to the same runtime.
    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn inner(&self) -> &Rc<RuntimeInner> {
        &self.inner
    }

    pub(crate) fn downgrade(&self) -> Weak<RuntimeInner> {
        Rc::downgrade(&self.inner)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("depth", &self.inner.context.depth())
            .field("effects", &self.effect_count())
            .finish()
    }
}

impl RuntimeInner {
    pub(crate) fn register(&self, computation: Rc<Computation>) {
        self.computations
            .borrow_mut()
            .insert(computation.id(), computation);
    }

    /// Look up a computation by id. The registry borrow is released before
    /// returning so the caller can run user code.
    pub(crate) fn computation(&self, id: SubscriberId) -> Option<Rc<Computation>> {
        self.computations.borrow().get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::SubscriptionPolicy;

    #[test]
    fn runtime_registers_computations() {
        let runtime = Runtime::new();
        let computation = Rc::new(Computation::new(|| {}));
        let id = computation.id();

        assert_eq!(runtime.effect_count(), 0);
        runtime.inner().register(computation);

        assert_eq!(runtime.effect_count(), 1);
        assert!(runtime.inner().computation(id).is_some());
        assert!(runtime.inner().computation(SubscriberId::new()).is_none());
    }

    #[test]
    fn dropping_runtime_drops_computations() {
        let runtime = Runtime::new();
        let computation = Rc::new(Computation::new(|| {}));
        let weak = Rc::downgrade(&computation);
        runtime.inner().register(computation);

        assert!(weak.upgrade().is_some());
        drop(runtime);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn clones_share_one_universe() {
        let a = Runtime::new();
        let b = a.clone();
        let c = Runtime::new();

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert!(Runtime::current().ptr_eq(&Runtime::current()));
    }

    #[test]
    fn config_is_kept() {
        let runtime = Runtime::with_config(
            RuntimeConfig::default().with_subscription_policy(SubscriptionPolicy::Prune),
        );
        assert_eq!(runtime.config().subscriptions, SubscriptionPolicy::Prune);
        assert!(!runtime.is_tracking());
        assert!(runtime.current_subscriber().is_none());
    }
}
