//! # Listeners and the providers that resolve them.
//!
//! This module provides the callback side of a dispatch:
//! - [`Listener`] - trait for synchronous event callbacks
//! - [`ListenerFn`] - closure-backed listener
//! - [`Propagation`] - continue / stop signal returned by listeners
//! - [`ListenerProvider`] - resolves an event to an ordered list of listeners
//! - [`ListenerSet`], [`ProviderFn`] - built-in providers
//!
//! ## Architecture
//! ```text
//! Dispatcher ──► ProviderRef ──► listeners_for(&Event) ──► [ListenerRef, ...]
//!                                                              │
//!                                               on_event(&Context, &mut Event)
//!                                                              ▼
//!                                            Continue │ Stop │ Err(ListenerError)
//! ```

mod listener;
mod provider;

pub use listener::{Listener, ListenerFn, ListenerRef, ListenerResult, Propagation};
pub use provider::{ListenerProvider, ListenerSet, ProviderFn, ProviderRef};
