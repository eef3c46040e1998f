//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, state handles
//! and effects, plus the equality rules that decide when a write counts as a
//! change.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within an effect, the signal automatically registers that effect as a
//! subscriber. When the signal's value changes, all subscribers re-run.
//!
//! ## State
//!
//! `state(initial)` wraps a value in a handle shaped by its kind: a record
//! or array gets one cell per property (fine-grained), anything else gets a single
//! cell behind a `value()` / `set_value()` pair.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that runs immediately and then
//! again whenever a cell it read changes. Effects may create nested effects;
//! each tracks its own reads.
//!
//! # Implementation Notes
//!
//! Dependency tracking is automatic: each [`Runtime`] keeps a stack of
//! running computations, and a cell read checks the top of that stack.
//! Notification is synchronous and depth-first: a write re-runs every
//! subscriber before it returns.
//!
//! Writes are gated by [`equal`]: writing a structurally equal value is a
//! no-op.
//!
//! The free functions [`signal()`], [`state()`], [`effect()`] and
//! [`untracked()`] use the calling thread's default runtime. Create a
//! [`Runtime`] explicitly to get an isolated reactive universe.

mod cell;
mod config;
mod context;
mod effect;
mod equality;
mod runtime;
mod signal;
mod state;
mod subscriber;

pub use config::{RuntimeConfig, SubscriptionPolicy};
pub use context::{ContextGuard, Frame, TrackingContext};
pub use effect::{effect, untracked};
pub use equality::{equal, Equal};
pub use runtime::Runtime;
pub use signal::{signal, Signal};
pub use state::{scalar, state, IntoState, ReactiveObject, ScalarState, Shape, State};
pub use subscriber::SubscriberId;
