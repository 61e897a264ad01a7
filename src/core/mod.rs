//! Dispatch core: context, registry and the dispatch loop.
//!
//! The public API from this module is [`Dispatcher`], [`Context`] and the
//! terminal-state types [`Outcome`] / [`Dispatched`].
//!
//! Internal modules:
//! - [`context`]: cancellation scope with optional deadline;
//! - [`registry`]: lock-protected topic → providers map;
//! - [`dispatcher`]: registration, reset and the dispatch loop;
//! - [`outcome`]: terminal states of a dispatch.

mod context;
mod dispatcher;
mod outcome;
mod registry;

pub use context::Context;
pub use dispatcher::Dispatcher;
pub use outcome::{Dispatched, Outcome};
