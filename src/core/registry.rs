//! # Provider registry - topic → ordered providers.
//!
//! The registry owns the per-topic provider lists of one dispatcher:
//! - `append(topic, providers)` → extends the topic's list, creating it if absent
//! - `snapshot(topic)` → clones the list handle for a dispatch
//! - `remove(topics)` / `clear()` → reset
//!
//! ## Architecture
//! ```text
//! RwLock<HashMap<Topic, Arc<Vec<ProviderRef>>>>
//!          │
//!          ├─► append   (write lock, Arc::make_mut → copy-on-write)
//!          ├─► snapshot (read lock, Arc::clone → O(1))
//!          └─► remove / clear (write lock)
//! ```
//!
//! ## Rules
//! - Insertion order is preserved per topic; duplicates are kept.
//! - The lock is held only for the map operation, never across a listener call.
//! - A snapshot taken by an in-flight dispatch is not affected by later appends.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::Topic;
use crate::listeners::ProviderRef;

/// Snapshot of one topic's providers, in registration order.
pub(crate) type Providers<D> = Arc<Vec<ProviderRef<D>>>;

/// Lock-protected topic → providers map.
pub(crate) struct Registry<D> {
    topics: RwLock<HashMap<Topic, Providers<D>>>,
    capacity: usize,
}

impl<D> Registry<D> {
    /// Creates an empty (initialized) registry.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends `providers` to the topic's list; returns the new list length.
    pub(crate) fn append(
        &self,
        topic: Topic,
        providers: impl IntoIterator<Item = ProviderRef<D>>,
    ) -> usize {
        let mut topics = self.topics.write();
        let list = Arc::make_mut(topics.entry(topic).or_default());
        list.extend(providers);
        list.len()
    }

    /// Returns the topic's providers, or `None` if nothing was ever registered.
    pub(crate) fn snapshot(&self, topic: &Topic) -> Option<Providers<D>> {
        self.topics.read().get(topic).map(Arc::clone)
    }

    /// Removes the given topics; returns how many were present.
    pub(crate) fn remove<'a>(&self, topics: impl IntoIterator<Item = &'a Topic>) -> usize {
        let mut map = self.topics.write();
        topics
            .into_iter()
            .filter(|topic| map.remove(*topic).is_some())
            .count()
    }

    /// Drops every topic and reinitializes an empty map.
    pub(crate) fn clear(&self) -> usize {
        let mut map = self.topics.write();
        let dropped = map.len();
        *map = HashMap::with_capacity(self.capacity);
        dropped
    }

    /// Returns the sorted list of registered topics.
    pub(crate) fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.read().keys().cloned().collect();
        topics.sort_unstable();
        topics
    }

    /// Number of providers registered for `topic`.
    pub(crate) fn len(&self, topic: &Topic) -> usize {
        self.topics.read().get(topic).map_or(0, |list| list.len())
    }
}
