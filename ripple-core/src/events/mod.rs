//! Event Delegation
//!
//! A registry that routes events to named actions through markup attributes.
//! An element that should trigger the `save` action on click carries the
//! attribute `on:click="save"`. Instead of attaching a listener per element,
//! one listener per event type is attached to a root; when an event arrives
//! the listener reads the `on:<event>` attribute of the event's target and
//! invokes every handler registered under that action name.
//!
//! The registry is independent of the reactive engine. The host document is
//! abstracted behind two traits:
//!
//! - [`DelegatedEvent`]: gives access to the attributes of an event's target.
//! - [`EventRoot`]: accepts a listener for an event type.

mod delegation;

pub use delegation::{DelegatedEvent, Delegator, EventRoot, HandlerId};
