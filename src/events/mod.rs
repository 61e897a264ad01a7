//! Event data model: topics and the dispatched payload carrier.
//!
//! ## Contents
//! - [`Topic`] normalized label used to look up listener providers
//! - [`Event`] mutable payload with optional transport references
//!
//! Both are created by the emitter per dispatch and dropped afterwards; the
//! dispatcher only reads the topic.

mod event;
mod topic;

pub use event::{Event, Transport};
pub use topic::Topic;
