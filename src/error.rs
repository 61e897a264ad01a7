//! Error types used by the dispatcher and its listeners.
//!
//! This module defines:
//!
//! - [`ContextError`]: why a [`Context`](crate::Context) is done (cancelled or past its deadline).
//! - [`Phase`]: where the dispatch loop observed a done context relative to a listener call.
//! - [`DispatchError`]: the terminal error returned by [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).
//! - [`ListenerError`]: the boxed error type listeners return.
//!
//! [`DispatchError`] provides helper methods (`as_label`, `as_message`) for logging/metrics
//! and accessors to test for the underlying cause.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Error returned by a listener to abort the dispatch.
///
/// Any error type can be boxed into it with `?` or `.into()`.
pub type ListenerError = Box<dyn StdError + Send + Sync + 'static>;

/// # Reason a context is done.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextError {
    /// The context (or one of its parents) was cancelled explicitly.
    #[error("context canceled")]
    Canceled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl ContextError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ContextError::Canceled => "context_canceled",
            ContextError::DeadlineExceeded => "context_deadline_exceeded",
        }
    }
}

/// Position of a context check relative to a listener call.
///
/// - `Before`: the context was already done before the listener ran.
/// - `After`: the context was done once the listener returned successfully (or asked to stop).
/// - `During`: the listener failed and the context was done when it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
    During,
}

impl Phase {
    /// Returns the lowercase phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
            Phase::During => "during",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Terminal errors of a dispatch.
///
/// A stop requested by a listener is not an error and never shows up here,
/// unless the context was done at the same time (then it is reported as [`DispatchError::Context`]).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The dispatch context was cancelled or hit its deadline.
    #[error("{cause} {phase} listener #{position} ({listener})")]
    Context {
        /// Where the loop observed the done context.
        phase: Phase,
        /// Zero-based position of the listener within its provider.
        position: usize,
        /// Name of the listener at that position.
        listener: Arc<str>,
        /// Underlying cancellation cause.
        #[source]
        cause: ContextError,
    },

    /// A listener returned an error while the context was still live.
    #[error(transparent)]
    Listener(ListenerError),

    /// A listener returned an error and the context was done when it returned.
    ///
    /// Both causes are kept: [`DispatchError::listener_error`] and
    /// [`DispatchError::context_cause`] expose them.
    #[error("listener #{position} ({listener}) failed: {error}; {cause} during listener #{position}")]
    Combined {
        /// Zero-based position of the listener within its provider.
        position: usize,
        /// Name of the failing listener.
        listener: Arc<str>,
        /// The error returned by the listener.
        #[source]
        error: ListenerError,
        /// Underlying cancellation cause.
        cause: ContextError,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicvisor::DispatchError;
    ///
    /// let err = DispatchError::Listener("boom".into());
    /// assert_eq!(err.as_label(), "dispatch_listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Context { .. } => "dispatch_context_done",
            DispatchError::Listener(_) => "dispatch_listener_failed",
            DispatchError::Combined { .. } => "dispatch_listener_failed_context_done",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Context {
                phase,
                position,
                cause,
                ..
            } => format!("{}: {phase} listener #{position}", cause.as_label()),
            DispatchError::Listener(e) => format!("listener error: {e}"),
            DispatchError::Combined {
                position,
                error,
                cause,
                ..
            } => format!(
                "listener error: {error}; {}: during listener #{position}",
                cause.as_label()
            ),
        }
    }

    /// Returns the cancellation cause, if the context was done.
    pub fn context_cause(&self) -> Option<ContextError> {
        match self {
            DispatchError::Context { cause, .. } | DispatchError::Combined { cause, .. } => {
                Some(*cause)
            }
            DispatchError::Listener(_) => None,
        }
    }

    /// Returns the phase in which the context was observed done.
    ///
    /// [`DispatchError::Combined`] always reports [`Phase::During`].
    pub fn phase(&self) -> Option<Phase> {
        match self {
            DispatchError::Context { phase, .. } => Some(*phase),
            DispatchError::Combined { .. } => Some(Phase::During),
            DispatchError::Listener(_) => None,
        }
    }

    /// Returns the listener's own error, if one was returned.
    pub fn listener_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            DispatchError::Listener(e) | DispatchError::Combined { error: e, .. } => {
                Some(e.as_ref())
            }
            DispatchError::Context { .. } => None,
        }
    }

    /// Downcasts the listener's error to a concrete type.
    ///
    /// # Example
    /// ```
    /// use topicvisor::DispatchError;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Rejected;
    /// impl std::fmt::Display for Rejected {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("rejected") }
    /// }
    /// impl std::error::Error for Rejected {}
    ///
    /// let err = DispatchError::Listener(Box::new(Rejected));
    /// assert_eq!(err.downcast_listener::<Rejected>(), Some(&Rejected));
    /// ```
    pub fn downcast_listener<E: StdError + 'static>(&self) -> Option<&E> {
        self.listener_error()?.downcast_ref::<E>()
    }

    /// True if the context was cancelled explicitly.
    pub fn is_canceled(&self) -> bool {
        self.context_cause() == Some(ContextError::Canceled)
    }

    /// True if the context deadline passed.
    pub fn is_deadline_exceeded(&self) -> bool {
        self.context_cause() == Some(ContextError::DeadlineExceeded)
    }
}
