//! # Dispatcher: topic registry and the dispatch loop.
//!
//! [`Dispatcher`] owns the topic → providers registry and runs listeners for an
//! event synchronously, on the calling thread, in registration order.
//!
//! ## Dispatch flow
//! ```text
//! dispatch(ctx, event)
//!   ├─► snapshot providers for event.topic ── none ──► (event, Ok)
//!   ├─► scope = ctx.child() (+ Config::timeout), cancelled on return
//!   └─► for provider in providers:
//!         for (position, listener) in provider.listeners_for(&event):
//!           ├─► scope done?               ──► Context { Before }
//!           ├─► listener.on_event(&scope, &mut event)
//!           └─► combine with scope state:
//!                 Ok(Continue) + live     ──► next
//!                 Ok(Continue) + done     ──► Context { After }
//!                 Ok(Stop)     + live     ──► (event, Ok)
//!                 Ok(Stop)     + done     ──► Context { After }
//!                 Err(e)       + live     ──► Listener(e)
//!                 Err(e)       + done     ──► Combined { e, During }
//! ```
//!
//! ## Rules
//! - Listeners run **sequentially**; the first halt ends the dispatch.
//! - `position` counts from zero within each provider.
//! - The registry lock is never held while a listener runs.
//! - Registration after the snapshot is not seen by the in-flight dispatch.
//!
//! ## Example
//! ```rust
//! use topicvisor::{Context, Dispatcher, Event, ListenerFn, ListenerSet, Propagation};
//!
//! let dispatcher = Dispatcher::<u32>::new();
//! dispatcher.add_provider(
//!     "counter",
//!     ListenerSet::<u32>::new()
//!         .with(ListenerFn::arc("inc", |_: &Context, ev: &mut Event<u32>| {
//!             *ev.data_mut() += 1;
//!             Ok(Propagation::Continue)
//!         }))
//!         .arc(),
//! );
//!
//! let (ev, res) = dispatcher.dispatch(&Context::background(), Event::new("counter", 41));
//! assert!(res.is_ok());
//! assert_eq!(*ev.data(), 42);
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{DispatchError, Phase};
use crate::events::{Event, Topic};
use crate::listeners::{ListenerRef, Propagation, ProviderRef};

use super::context::Context;
use super::outcome::{Dispatched, Outcome};
use super::registry::Registry;

/// Topic-scoped synchronous event dispatcher.
///
/// `Send + Sync`: share it with `Arc` and dispatch from many threads at once.
pub struct Dispatcher<D> {
    registry: Registry<D>,
    config: Config,
}

impl<D: 'static> Dispatcher<D> {
    /// Creates a dispatcher with [`Config::default`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a dispatcher with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            registry: Registry::new(config.capacity),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Appends `providers` to `topic`, in order. Duplicates are kept.
    pub fn add_providers<I>(&self, topic: impl Into<Topic>, providers: I) -> &Self
    where
        I: IntoIterator<Item = ProviderRef<D>>,
    {
        let topic = topic.into();
        let total = self.registry.append(topic.clone(), providers);
        debug!(topic = %topic, providers = total, "providers registered");
        self
    }

    /// Appends a single provider to `topic`.
    pub fn add_provider(&self, topic: impl Into<Topic>, provider: ProviderRef<D>) -> &Self {
        self.add_providers(topic, [provider])
    }

    /// Removes the providers of the given topics.
    ///
    /// An empty `topics` clears the whole registry. Prefer [`Dispatcher::reset_all`]
    /// for that: an empty literal such as `reset([])` leaves the topic type
    /// uninferred.
    pub fn reset<I, T>(&self, topics: I) -> &Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Topic>,
    {
        let topics: Vec<Topic> = topics.into_iter().map(Into::into).collect();
        if topics.is_empty() {
            return self.reset_all();
        }
        let removed = self.registry.remove(&topics);
        debug!(topics = ?topics, removed, "topics reset");
        self
    }

    /// Drops every registered provider.
    pub fn reset_all(&self) -> &Self {
        let removed = self.registry.clear();
        debug!(removed, "registry reset");
        self
    }

    /// Returns the sorted list of topics with a provider list.
    pub fn topics(&self) -> Vec<Topic> {
        self.registry.topics()
    }

    /// Number of providers registered for `topic`.
    pub fn provider_count(&self, topic: impl Into<Topic>) -> usize {
        self.registry.len(&topic.into())
    }

    /// True if `topic` has a provider list (possibly empty).
    pub fn has_providers(&self, topic: impl Into<Topic>) -> bool {
        self.registry.snapshot(&topic.into()).is_some()
    }

    /// Dispatches `event` to the listeners registered for its topic.
    ///
    /// Returns the event (with whatever mutations listeners made before the
    /// dispatch ended) and `Ok(())` on completion or clean stop.
    pub fn dispatch(
        &self,
        ctx: &Context,
        event: Event<D>,
    ) -> (Event<D>, Result<(), DispatchError>) {
        self.run(ctx, event).into_parts()
    }

    /// Same as [`Dispatcher::dispatch`], reporting the exact terminal [`Outcome`].
    pub fn run(&self, ctx: &Context, mut event: Event<D>) -> Dispatched<D> {
        let Some(providers) = self.registry.snapshot(event.topic()) else {
            trace!(topic = %event.topic(), "no providers");
            return Dispatched {
                event,
                outcome: Outcome::Completed,
            };
        };

        let scope = match self.config.dispatch_timeout() {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.child(),
        };
        let _release = scope.drop_guard();

        let outcome = run_providers(&scope, &providers, &mut event);
        debug!(
            topic = %event.topic(),
            outcome = outcome.as_label(),
            "dispatch finished"
        );
        Dispatched { event, outcome }
    }
}

impl<D: 'static> Default for Dispatcher<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-listener decision of the loop.
enum Step {
    Next,
    Halt(Outcome),
}

fn run_providers<D: 'static>(
    scope: &Context,
    providers: &[ProviderRef<D>],
    event: &mut Event<D>,
) -> Outcome {
    for provider in providers {
        let listeners = provider.listeners_for(event);
        trace!(provider = provider.name(), listeners = listeners.len(), "provider resolved");
        for (position, listener) in listeners.iter().enumerate() {
            if let Step::Halt(outcome) = run_listener(scope, position, listener, event) {
                return outcome;
            }
        }
    }
    Outcome::Completed
}

fn run_listener<D: 'static>(
    scope: &Context,
    position: usize,
    listener: &ListenerRef<D>,
    event: &mut Event<D>,
) -> Step {
    if let Some(cause) = scope.err() {
        return Step::Halt(Outcome::Failed(DispatchError::Context {
            phase: Phase::Before,
            position,
            listener: Arc::from(listener.name()),
            cause,
        }));
    }

    trace!(position, listener = listener.name(), "invoking listener");
    let result = listener.on_event(scope, event);

    match (result, scope.err()) {
        (Ok(Propagation::Continue), None) => Step::Next,
        (Ok(Propagation::Stop), None) => Step::Halt(Outcome::Stopped),
        (Ok(_), Some(cause)) => Step::Halt(Outcome::Failed(DispatchError::Context {
            phase: Phase::After,
            position,
            listener: Arc::from(listener.name()),
            cause,
        })),
        (Err(error), None) => Step::Halt(Outcome::Failed(DispatchError::Listener(error))),
        (Err(error), Some(cause)) => Step::Halt(Outcome::Failed(DispatchError::Combined {
            position,
            listener: Arc::from(listener.name()),
            error,
            cause,
        })),
    }
}
