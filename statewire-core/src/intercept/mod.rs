//! Function interception.
//!
//! Every call into the graphics API goes through [`Engine::call`]. The engine
//! forwards it to the [`ApiSurface`] unchanged, and once the surface returns
//! it runs the entry point's observer chain. Observers never see a failed
//! call: an error from the surface is handed straight back to the caller.
//!
//! [`Engine::call`]: crate::engine::Engine::call

mod observer;
mod stack;

pub use observer::{Call, Chain, Observer, ObserverFn, ObserverKind, ObserverTable, ViewFactory};
pub use stack::{CallStack, FrameGuard};

use crate::value::Value;

/// The original implementation of the intercepted API.
///
/// Entry points are looked up by name. An implementation returns
/// [`Value::Void`] for entry points that return nothing.
pub trait ApiSurface: 'static {
    type Error: std::error::Error + 'static;

    fn invoke(&mut self, entry_point: &str, args: &[Value]) -> Result<Value, Self::Error>;
}
