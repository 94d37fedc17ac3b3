//! Error types.
//!
//! Structural errors (a handle the registry never saw, a malformed edge) are
//! programmer errors and are returned to the caller at the point of misuse.
//! State divergence (stale edges, unchanged values) is never an error.

use thiserror::Error;

use crate::value::Handle;

/// Errors raised by the engine itself.
#[derive(Debug, Error)]
pub enum Error {
    /// A handle reached the registry without ever passing through a
    /// creation observer.
    #[error("handle {0} was never observed by the object registry")]
    UnregisteredHandle(Handle),

    #[error("handle {0} is already registered")]
    DuplicateHandle(Handle),

    #[error("the default object cannot be deleted")]
    DefaultObjectNotDeletable,

    #[error("`{entry_point}` returned {found} where a handle was expected")]
    ExpectedHandle {
        entry_point: String,
        found: &'static str,
    },

    #[error("`{entry_point}` was called without a handle argument")]
    MissingHandleArgument { entry_point: String },

    #[error("invalid edge: {0}")]
    InvalidEdge(&'static str),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("msgpack: {0}")]
    MsgPack(#[from] rmp_serde::encode::Error),
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of an intercepted call.
///
/// `Api` carries the original implementation's error untouched; when it is
/// returned no observer has run.
#[derive(Debug, Error)]
pub enum CallError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Api(E),

    #[error(transparent)]
    Engine(#[from] Error),
}

impl<E> CallError<E>
where
    E: std::error::Error + 'static,
{
    /// The original API error, if that is what failed.
    pub fn as_api(&self) -> Option<&E> {
        match self {
            CallError::Api(e) => Some(e),
            CallError::Engine(_) => None,
        }
    }
}
