//! Ripple Core
//!
//! This crate provides a fine-grained reactive state-tracking engine.
//! It implements:
//!
//! - Reactive cells: function-style signals and object-style state with
//!   per-property reactivity
//! - Effects that re-run automatically when the cells they read change
//! - Structural equality that turns writes of unchanged values into no-ops
//! - An event-delegation registry for routing host events to named actions
//!
//! Everything is single-threaded and synchronous: a write re-runs its
//! subscribers before it returns. There is no batching and no scheduler.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Cells, effects, the tracking stack and the runtime
//! - `value`: Dynamically typed values with JSON interop and coercions
//! - `events`: Attribute-based event delegation
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use ripple_core::{effect, signal};
//!
//! let count = signal(0);
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let (c, l) = (count.clone(), log.clone());
//! effect(move || l.borrow_mut().push(c.get()));
//!
//! count.set(count.get() + 1);
//! count.set(count.get() + 1);
//! assert_eq!(*log.borrow(), vec![0, 1, 2]);
//! ```

mod macros;

pub mod error;
pub mod events;
pub mod reactive;
pub mod value;

pub use error::{ReactiveError, Result};
pub use reactive::{effect, equal, scalar, signal, state, untracked, Equal, Runtime, Signal};
pub use value::{Opaque, Record, Value};
