//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized defaults for a [`Dispatcher`](crate::Dispatcher).
//!
//! ## Sentinel values
//! - `timeout = 0s` → no dispatcher-imposed deadline (the caller's context still applies)

use std::time::Duration;

/// Settings applied to every dispatch of a dispatcher.
///
/// ## Field semantics
/// - `timeout`: Deadline added to each dispatch scope (`0s` = none)
/// - `capacity`: Initial number of topic slots reserved in the registry
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Per-dispatch timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = the derived dispatch scope ends after this long, or earlier
    ///   if the caller's context has a nearer deadline
    ///
    /// Expiry is reported like any other deadline: `ContextError::DeadlineExceeded`.
    pub timeout: Duration,

    /// Registry capacity hint (number of topics).
    pub capacity: usize,
}

impl Config {
    /// Returns the per-dispatch timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → deadline `now + d` for each dispatch
    #[inline]
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a copy with the given per-dispatch timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `timeout = 0s` (no timeout)
    /// - `capacity = 16`
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            capacity: 16,
        }
    }
}
