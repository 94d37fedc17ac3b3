//! Dependency tracking between entry points and views.
//!
//! Views subscribe a resync callback to every entry point that can change
//! what they display. After an intercepted call returns, the engine asks the
//! [`DependencyMap`] for that entry point's subscribers and runs them
//! synchronously, in order, on the calling thread.
//!
//! Diffing is not done here. A subscriber runs on every matching call, and
//! the view decides whether anything it shows actually changed.

mod map;
mod subscriber;

pub use map::DependencyMap;
pub use subscriber::{Callback, Subscriber, SubscriberId};
