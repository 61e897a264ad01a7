//! # Events carried through a dispatch.
//!
//! An [`Event`] bundles:
//! - a [`Topic`] fixed at construction (used to find providers),
//! - a freely mutable `data` payload (never inspected by the dispatcher),
//! - optional transport references (`request` / `response`) shared with the emitter.
//!
//! Listeners receive `&mut Event<D>` and may overwrite `data`; the topic can only
//! be changed by deriving a new event with [`Event::with_topic`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use topicvisor::Event;
//!
//! struct Request { path: &'static str }
//!
//! let mut ev = Event::new("http.request", 0u32)
//!     .with_request(Arc::new(Request { path: "/health" }));
//!
//! ev.set_data(200);
//!
//! assert_eq!(ev.topic().as_str(), "http-request");
//! assert_eq!(*ev.data(), 200);
//! assert_eq!(ev.request::<Request>().map(|r| r.path), Some("/health"));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::topic::Topic;

/// Shared, type-erased transport reference (an inbound request or outbound response).
pub type Transport = Arc<dyn Any + Send + Sync>;

/// Mutable payload carrier dispatched to listeners.
#[derive(Clone)]
pub struct Event<D> {
    topic: Topic,
    data: D,
    request: Option<Transport>,
    response: Option<Transport>,
}

impl<D> Event<D> {
    /// Creates an event for `topic` (normalized) carrying `data`.
    pub fn new(topic: impl Into<Topic>, data: D) -> Self {
        Self {
            topic: topic.into(),
            data,
            request: None,
            response: None,
        }
    }

    /// Returns the event topic.
    #[inline]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Returns the payload.
    #[inline]
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Returns the payload for in-place mutation.
    #[inline]
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Replaces the payload, returning the previous one.
    #[inline]
    pub fn set_data(&mut self, data: D) -> D {
        std::mem::replace(&mut self.data, data)
    }

    /// Consumes the event and returns the payload.
    pub fn into_data(self) -> D {
        self.data
    }

    /// Attaches the inbound request reference.
    pub fn with_request<R: Any + Send + Sync>(mut self, request: Arc<R>) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches the outbound response reference.
    pub fn with_response<R: Any + Send + Sync>(mut self, response: Arc<R>) -> Self {
        self.response = Some(response);
        self
    }

    /// Returns the request reference if it is an `R`.
    pub fn request<R: Any>(&self) -> Option<&R> {
        self.request.as_deref()?.downcast_ref::<R>()
    }

    /// Returns the response reference if it is an `R`.
    pub fn response<R: Any>(&self) -> Option<&R> {
        self.response.as_deref()?.downcast_ref::<R>()
    }

    /// True if a request reference is attached.
    #[inline]
    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }

    /// True if a response reference is attached.
    #[inline]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Returns a copy of this event under another topic.
    ///
    /// Data is cloned; transport references are shared, not copied.
    pub fn with_topic(&self, topic: impl Into<Topic>) -> Self
    where
        D: Clone,
    {
        Self {
            topic: topic.into(),
            data: self.data.clone(),
            request: self.request.clone(),
            response: self.response.clone(),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Event<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("topic", &self.topic)
            .field("data", &self.data)
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .finish()
    }
}
