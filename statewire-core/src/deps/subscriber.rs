//! Subscriber types for the dependency map.
//!
//! A Subscriber is a resync callback registered by a view. Closures have no
//! usable identity in Rust, so each subscriber carries a [`SubscriberId`];
//! the dependency map uses it to keep its per-entry-point sets free of
//! duplicates.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::Engine;
use crate::error::Result;
use crate::intercept::ApiSurface;

/// Unique identifier for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared resync callback.
pub type Callback<A> = Rc<dyn Fn(&Engine<A>) -> Result<()>>;

/// A resync callback together with its identity.
///
/// Cloning shares both the callback and the id, so a clone subscribed to
/// the same entry point is still the same subscriber.
pub struct Subscriber<A: ApiSurface> {
    id: SubscriberId,
    callback: Callback<A>,
}

impl<A: ApiSurface> Subscriber<A> {
    /// Create a new subscriber with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Engine<A>) -> Result<()> + 'static,
    {
        Self {
            id: SubscriberId::new(),
            callback: Rc::new(callback),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn callback(&self) -> Callback<A> {
        Rc::clone(&self.callback)
    }

    /// Run the callback directly, outside of any notification.
    pub fn notify(&self, engine: &Engine<A>) -> Result<()> {
        (self.callback)(engine)
    }
}

impl<A: ApiSurface> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<A: ApiSurface> fmt::Debug for Subscriber<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
