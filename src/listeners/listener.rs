//! # Listener abstraction and function-backed listener.
//!
//! A [`Listener`] is invoked by the dispatcher with the dispatch [`Context`] and a
//! mutable [`Event`]. It answers with a [`ListenerResult`]:
//!
//! ```text
//! Ok(Propagation::Continue) ──► next listener runs
//! Ok(Propagation::Stop)     ──► dispatch ends cleanly (unless the context is done)
//! Err(e)                    ──► dispatch ends with `e`
//! ```
//!
//! [`ListenerFn`] wraps a closure; the common handle type is [`ListenerRef`].
//!
//! ## Example
//! ```rust
//! use topicvisor::{Context, Event, ListenerFn, ListenerRef, Propagation};
//!
//! let upper: ListenerRef<String> = ListenerFn::arc("upper", |_ctx: &Context, ev: &mut Event<String>| {
//!     let up = ev.data().to_uppercase();
//!     ev.set_data(up);
//!     Ok(Propagation::Continue)
//! });
//!
//! let mut ev = Event::new("greet", String::from("hi"));
//! upper.on_event(&Context::background(), &mut ev).unwrap();
//! assert_eq!(ev.data(), "HI");
//! assert_eq!(upper.name(), "upper");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::core::Context;
use crate::error::ListenerError;
use crate::events::Event;

/// What the dispatcher should do after a listener returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Run the next listener.
    #[default]
    Continue,
    /// End the dispatch without error; remaining listeners are skipped.
    Stop,
}

/// Result returned by a listener.
pub type ListenerResult = Result<Propagation, ListenerError>;

/// Shared handle to a listener.
pub type ListenerRef<D> = Arc<dyn Listener<D>>;

/// # Synchronous event callback.
///
/// Runs on the dispatching thread. Implementations should check `ctx` when doing
/// long work and return early once it is done; the dispatcher re-checks the
/// context after every call either way.
pub trait Listener<D>: Send + Sync + 'static {
    /// Handles one event. May mutate the event data.
    fn on_event(&self, ctx: &Context, event: &mut Event<D>) -> ListenerResult;

    /// Returns the listener name used in errors and logs.
    ///
    /// The default uses `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed listener.
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a [`ListenerRef`].
    pub fn new<D>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Context, &mut Event<D>) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc<D>(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn(&Context, &mut Event<D>) -> ListenerResult + Send + Sync + 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

impl<D, F> Listener<D> for ListenerFn<F>
where
    F: Fn(&Context, &mut Event<D>) -> ListenerResult + Send + Sync + 'static,
{
    fn on_event(&self, ctx: &Context, event: &mut Event<D>) -> ListenerResult {
        (self.f)(ctx, event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for ListenerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerFn").field("name", &self.name).finish()
    }
}
