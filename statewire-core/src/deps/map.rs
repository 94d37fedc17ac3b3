//! Dependency Map
//!
//! Maps entry-point names to the ordered set of subscribers whose displayed
//! state can change when that entry point runs.
//!
//! # Ordering and duplicates
//!
//! Subscribers run in the order they first subscribed to an entry point.
//! Subscribing the same subscriber again is a no-op, so each subscriber runs
//! exactly once per call no matter how many of its slots share a setter.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::subscriber::{Callback, Subscriber, SubscriberId};
use crate::intercept::ApiSurface;

/// Entry point → subscribers, plus the callbacks behind the ids.
pub struct DependencyMap<A: ApiSurface> {
    entries: IndexMap<String, IndexSet<SubscriberId>>,
    callbacks: HashMap<SubscriberId, Callback<A>>,
}

impl<A: ApiSurface> DependencyMap<A> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            callbacks: HashMap::new(),
        }
    }

    /// Subscribe to one entry point.
    ///
    /// Returns `false` if the subscriber was already subscribed to it.
    pub fn subscribe(&mut self, entry_point: &str, subscriber: &Subscriber<A>) -> bool {
        self.callbacks
            .entry(subscriber.id())
            .or_insert_with(|| subscriber.callback());

        let inserted = match self.entries.get_mut(entry_point) {
            Some(set) => set.insert(subscriber.id()),
            None => {
                let mut set = IndexSet::new();
                set.insert(subscriber.id());
                self.entries.insert(entry_point.to_owned(), set);
                true
            }
        };

        if !inserted {
            tracing::trace!(entry_point, subscriber = ?subscriber.id(), "duplicate subscription ignored");
        }
        inserted
    }

    /// Remove a subscriber from every entry point.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.callbacks.remove(&id);
        for set in self.entries.values_mut() {
            set.shift_remove(&id);
        }
    }

    /// The callbacks to run for an entry point, in subscription order.
    ///
    /// Returns owned handles so the caller can release its borrow of the map
    /// before running them; callbacks may subscribe or call back into the
    /// engine.
    pub fn subscribers_for(&self, entry_point: &str) -> Vec<Callback<A>> {
        self.entries
            .get(entry_point)
            .map(|set| {
                set.iter()
                    .filter_map(|id| self.callbacks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, entry_point: &str) -> usize {
        self.entries.get(entry_point).map_or(0, IndexSet::len)
    }

    pub fn is_subscribed(&self, entry_point: &str, id: SubscriberId) -> bool {
        self.entries
            .get(entry_point)
            .is_some_and(|set| set.contains(&id))
    }

    /// Entry points that have at least one subscriber, in first-use order.
    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(name, _)| name.as_str())
    }
}

impl<A: ApiSurface> Default for DependencyMap<A> {
    fn default() -> Self {
        Self::new()
    }
}
