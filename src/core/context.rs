//! # Cancellation scope with an optional deadline.
//!
//! [`Context`] is what the emitter hands to [`Dispatcher::dispatch`](crate::Dispatcher::dispatch)
//! and what every listener receives. It wraps a [`CancellationToken`] and adds:
//! - an optional **deadline** (the earliest one along the parent chain),
//! - the **cause** the scope ended with ([`ContextError`]).
//!
//! ## Scoping
//! ```text
//! background ──► child ──► child (deadline = min(own, parent))
//!     │            │
//!     └ cancel() ──┴──► propagates down, never up
//! ```
//!
//! ## Rules
//! - The first observed cause wins; later cancellations do not overwrite it.
//! - Deadlines are observed lazily: `err()` / `is_done()` notice an expired
//!   deadline and cancel the token with [`ContextError::DeadlineExceeded`].
//! - [`Context::done`] wakes on either cancellation or deadline (tokio timer).
//!
//! ## Example
//! ```rust
//! use topicvisor::{Context, ContextError};
//!
//! let root = Context::background();
//! let child = root.child();
//!
//! child.cancel();
//! assert_eq!(child.err(), Some(ContextError::Canceled));
//! assert_eq!(root.err(), None);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::ContextError;

struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
    cause: OnceLock<ContextError>,
    parent: Option<Context>,
}

/// Cancellation scope passed through a dispatch.
///
/// Cheap to clone; clones share the same scope.
#[derive(Clone)]
pub struct Context {
    scope: Arc<Scope>,
}

impl Context {
    /// Returns a root context that is never done unless cancelled.
    pub fn background() -> Self {
        Self {
            scope: Arc::new(Scope {
                token: CancellationToken::new(),
                deadline: None,
                cause: OnceLock::new(),
                parent: None,
            }),
        }
    }

    /// Derives a child scope.
    ///
    /// Cancelling the child never affects `self`; cancelling `self` ends the child.
    pub fn child(&self) -> Self {
        self.derive(None)
    }

    /// Derives a child scope that ends at `deadline` (or earlier, if `self` does).
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.derive(Some(deadline))
    }

    /// Derives a child scope that ends after `timeout` (or earlier, if `self` does).
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.derive(Instant::now().checked_add(timeout))
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        let deadline = match (self.scope.deadline, deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            scope: Arc::new(Scope {
                token: self.scope.token.child_token(),
                deadline,
                cause: OnceLock::new(),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Cancels this scope and all scopes derived from it.
    pub fn cancel(&self) {
        self.cancel_with(ContextError::Canceled);
    }

    fn cancel_with(&self, cause: ContextError) {
        let _ = self.scope.cause.set(cause);
        self.scope.token.cancel();
    }

    /// Returns why the scope is done, or `None` while it is live.
    pub fn err(&self) -> Option<ContextError> {
        if let Some(cause) = self.scope.cause.get() {
            return Some(*cause);
        }
        if let Some(cause) = self.scope.parent.as_ref().and_then(Context::err) {
            self.cancel_with(cause);
            return self.scope.cause.get().copied();
        }
        if self.scope.deadline.is_some_and(|d| Instant::now() >= d) {
            self.cancel_with(ContextError::DeadlineExceeded);
            return self.scope.cause.get().copied();
        }
        if self.scope.token.is_cancelled() {
            // cancelled through a token clone handed out by `token()`
            self.cancel_with(ContextError::Canceled);
            return self.scope.cause.get().copied();
        }
        None
    }

    /// True once the scope is cancelled or past its deadline.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Returns the effective deadline, if any.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.scope.deadline
    }

    /// Returns the time left until the deadline (zero once passed).
    pub fn remaining(&self) -> Option<Duration> {
        self.scope
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns the underlying token (for `select!` or handing to spawned work).
    ///
    /// Cancelling the returned token ends this scope with [`ContextError::Canceled`].
    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.scope.token
    }

    /// Waits until the scope is cancelled or its deadline passes.
    ///
    /// Must be polled within a tokio runtime when a deadline is set.
    pub async fn done(&self) {
        match self.scope.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.scope.token.cancelled() => {}
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                        self.cancel_with(ContextError::DeadlineExceeded);
                    }
                }
            }
            None => self.scope.token.cancelled().await,
        }
    }

    /// Returns a guard that cancels this scope when dropped.
    pub fn drop_guard(&self) -> DropGuard {
        self.scope.token.clone().drop_guard()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.scope.deadline)
            .field("cause", &self.scope.cause.get())
            .field("cancelled", &self.scope.token.is_cancelled())
            .finish()
    }
}
