//! # topicvisor
//!
//! **Topicvisor** is a synchronous, topic-scoped event dispatcher for Rust.
//!
//! Emitters build an [`Event`] tagged with a [`Topic`]; the [`Dispatcher`] looks up
//! the [`ListenerProvider`]s registered for that topic and runs their listeners
//! one after another on the calling thread, all mutating the same event.
//! Dispatch honors a caller-supplied [`Context`] (cancellation + deadline), lets a
//! listener end propagation cleanly with [`Propagation::Stop`], and reports
//! listener failures and cancellation together when they race.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Emitter
//!     │  Event { topic, data, request?, response? }
//!     ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - Registry: RwLock<Topic → [ProviderRef, ...]> (snapshot lookup) │
//! │  - Config:   per-dispatch timeout                                 │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ scope = ctx.child()   (cancelled when dispatch returns)
//!        ▼
//!   Provider #1 ──► [L0, L1, ...]     Provider #2 ──► [L0, ...]
//!        │                                  │
//!        ▼                                  ▼
//!   check scope ─► on_event(&scope, &mut event) ─► check scope ─► next / halt
//! ```
//!
//! ### Terminal states
//! ```text
//! Running ──► Completed | Stopped | Failed(Context | Listener | Combined)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------|--------------------------------------------|
//! | **Dispatch**      | Ordered, synchronous listener invocation per topic.         | [`Dispatcher`], [`Outcome`], [`Dispatched`] |
//! | **Listeners**     | Callbacks and the providers that resolve them.              | [`Listener`], [`ListenerFn`], [`ListenerProvider`], [`ListenerSet`], [`ProviderFn`] |
//! | **Cancellation**  | Scoped cancellation with deadlines.                         | [`Context`]                                |
//! | **Events**        | Normalized topics and payload carriers.                     | [`Topic`], [`Event`]                       |
//! | **Errors**        | Phase-tagged context errors, combined failures.             | [`DispatchError`], [`ContextError`], [`Phase`] |
//! | **Configuration** | Dispatcher defaults.                                        | [`Config`]                                 |
//!
//! ## Example
//! ```rust
//! use topicvisor::{Context, Dispatcher, Event, ListenerFn, ListenerSet, Propagation};
//!
//! let dispatcher = Dispatcher::<String>::new();
//! dispatcher
//!     .add_provider(
//!         "user.created",
//!         ListenerSet::<String>::new()
//!             .with(ListenerFn::arc("greet", |_: &Context, ev: &mut Event<String>| {
//!                 let greeting = format!("hello, {}", ev.data());
//!                 ev.set_data(greeting);
//!                 Ok(Propagation::Continue)
//!             }))
//!             .with(ListenerFn::arc("halt", |_: &Context, _: &mut Event<String>| {
//!                 Ok(Propagation::Stop)
//!             }))
//!             .arc(),
//!     );
//!
//! let (ev, res) = dispatcher.dispatch(
//!     &Context::background(),
//!     Event::new("user.created", "ada".to_string()),
//! );
//! assert!(res.is_ok());
//! assert_eq!(ev.data(), "hello, ada");
//! ```

mod config;
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use config::Config;
pub use self::core::{Context, Dispatched, Dispatcher, Outcome};
pub use error::{ContextError, DispatchError, ListenerError, Phase};
pub use events::{Event, Topic, Transport};
pub use listeners::{
    Listener, ListenerFn, ListenerProvider, ListenerRef, ListenerResult, ListenerSet, Propagation,
    ProviderFn, ProviderRef,
};
