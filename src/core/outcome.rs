//! # Terminal states of a dispatch.
//!
//! Every dispatch moves from running to exactly one terminal state:
//!
//! ```text
//! Running ──► Completed                  all listeners ran (or none registered)
//!         ├─► Stopped                    a listener returned Propagation::Stop
//!         └─► Failed(DispatchError)
//!               ├─ Context  { .. }       StoppedWithContextError
//!               ├─ Listener(..)          StoppedWithListenerError
//!               └─ Combined { .. }       StoppedWithCombinedError
//! ```
//!
//! [`Dispatched`] bundles the terminal state with the event as developed so far.

use crate::error::DispatchError;
use crate::events::Event;

/// Terminal state of one dispatch.
#[derive(Debug)]
pub enum Outcome {
    /// Every listener ran and asked to continue (or there was nothing to run).
    Completed,
    /// A listener asked to stop while the context was live.
    Stopped,
    /// The dispatch ended with an error.
    Failed(DispatchError),
}

impl Outcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Stopped => "stopped_clean",
            Outcome::Failed(DispatchError::Context { .. }) => "stopped_context_error",
            Outcome::Failed(DispatchError::Listener(_)) => "stopped_listener_error",
            Outcome::Failed(DispatchError::Combined { .. }) => "stopped_combined_error",
        }
    }

    /// True for `Completed` and `Stopped`.
    #[inline]
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    /// Returns the error, if the dispatch failed.
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Collapses the state into the `Result` returned by `Dispatcher::dispatch`.
    pub fn into_result(self) -> Result<(), DispatchError> {
        match self {
            Outcome::Completed | Outcome::Stopped => Ok(()),
            Outcome::Failed(e) => Err(e),
        }
    }
}

/// Result of [`Dispatcher::run`](crate::Dispatcher::run).
///
/// When the outcome is a failure, `event` holds the mutations made up to the halt point.
#[derive(Debug)]
pub struct Dispatched<D> {
    /// The event, possibly mutated by listeners.
    pub event: Event<D>,
    /// How the dispatch ended.
    pub outcome: Outcome,
}

impl<D> Dispatched<D> {
    /// Splits into the `(event, result)` pair returned by `Dispatcher::dispatch`.
    pub fn into_parts(self) -> (Event<D>, Result<(), DispatchError>) {
        (self.event, self.outcome.into_result())
    }
}
