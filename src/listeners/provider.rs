//! # Listener providers.
//!
//! A [`ListenerProvider`] resolves an [`Event`] to the ordered listeners that
//! should handle it. The dispatcher registers providers per topic and asks each
//! of them, in registration order, for listeners at dispatch time.
//!
//! Built-in providers:
//! - [`ListenerSet`] a fixed ordered list, returned for every event;
//! - [`ProviderFn`] a closure deciding per event.
//!
//! ## Example
//! ```rust
//! use topicvisor::{Context, Event, ListenerFn, ListenerProvider, ListenerSet, Propagation};
//!
//! let set = ListenerSet::<u8>::new()
//!     .with(ListenerFn::arc("first", |_: &Context, _: &mut Event<u8>| Ok(Propagation::Continue)))
//!     .with(ListenerFn::arc("second", |_: &Context, _: &mut Event<u8>| Ok(Propagation::Stop)));
//!
//! let names: Vec<_> = set
//!     .listeners_for(&Event::new("t", 0u8))
//!     .iter()
//!     .map(|l| l.name().to_string())
//!     .collect();
//! assert_eq!(names, ["first", "second"]);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::events::Event;

use super::listener::ListenerRef;

/// Shared handle to a provider.
pub type ProviderRef<D> = Arc<dyn ListenerProvider<D>>;

/// Resolves an event to an ordered sequence of listeners.
///
/// An empty vector means "nothing to run for this event".
pub trait ListenerProvider<D>: Send + Sync + 'static {
    /// Returns the listeners for `event`, in invocation order.
    fn listeners_for(&self, event: &Event<D>) -> Vec<ListenerRef<D>>;

    /// Returns the provider name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Fixed, ordered list of listeners.
pub struct ListenerSet<D> {
    listeners: Vec<ListenerRef<D>>,
}

impl<D> ListenerSet<D> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener (builder style).
    #[must_use]
    pub fn with(mut self, listener: ListenerRef<D>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Appends a listener.
    pub fn push(&mut self, listener: ListenerRef<D>) {
        self.listeners.push(listener);
    }

    /// Wraps the set into a shared provider handle.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of listeners in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if the set holds no listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<D> Default for ListenerSet<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> FromIterator<ListenerRef<D>> for ListenerSet<D> {
    fn from_iter<I: IntoIterator<Item = ListenerRef<D>>>(iter: I) -> Self {
        Self {
            listeners: iter.into_iter().collect(),
        }
    }
}

impl<D: 'static> ListenerProvider<D> for ListenerSet<D> {
    fn listeners_for(&self, _event: &Event<D>) -> Vec<ListenerRef<D>> {
        self.listeners.clone()
    }

    fn name(&self) -> &str {
        "listener_set"
    }
}

impl<D: 'static> fmt::Debug for ListenerSet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("ListenerSet").field("listeners", &names).finish()
    }
}

/// Function-backed provider: the closure picks listeners per event.
pub struct ProviderFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProviderFn<F> {
    /// Creates a named provider from a closure.
    pub fn new<D>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Event<D>) -> Vec<ListenerRef<D>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the provider and returns it as a shared handle.
    pub fn arc<D>(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn(&Event<D>) -> Vec<ListenerRef<D>> + Send + Sync + 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

impl<D, F> ListenerProvider<D> for ProviderFn<F>
where
    F: Fn(&Event<D>) -> Vec<ListenerRef<D>> + Send + Sync + 'static,
{
    fn listeners_for(&self, event: &Event<D>) -> Vec<ListenerRef<D>> {
        (self.f)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for ProviderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFn").field("name", &self.name).finish()
    }
}
