//! Statewire Core
//!
//! This crate provides the engine behind a live state diagram for a
//! handle-based graphics API. It intercepts every call into the API, keeps
//! track of the objects the API creates and deletes, and keeps a set of
//! panels and the arrows between them in sync with the live API state.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `intercept`: the proxy calls go through, and the observers that run
//!   after each call
//! - `registry`: stable identity, names and deletion state for API handles
//! - `deps`: which views resync when an entry point runs
//! - `view`: the contract panels implement, plus reusable state tables
//! - `arrows`: directed edges between panels and their routed curves
//! - `engine`: the explicitly constructed state tying it all together
//!
//! # Example
//!
//! ```rust,ignore
//! use statewire_core::{Engine, ObjectKind, ReferenceKind, SlotDescriptor, StateTableView};
//!
//! let engine = Engine::new(gl);
//! engine.track_creation("createBuffer", ObjectKind::Buffer, buffer_view);
//! engine.track_deletion("deleteBuffer");
//!
//! let bindings = StateTableView::new(
//!     "buffer bindings",
//!     vec![SlotDescriptor::new("ARRAY_BUFFER_BINDING")
//!         .setter("bindBuffer")
//!         .reference(ReferenceKind::Object)],
//!     |engine, slot| engine.api().get_parameter(slot.pname()),
//! );
//! bindings.mount(&engine)?;
//!
//! let buffer = engine.call("createBuffer", &[])?;
//! engine.call("bindBuffer", &[ARRAY_BUFFER.into(), buffer])?;
//! // The bindings table now shows the buffer and draws an arrow to it.
//! ```

pub mod arrows;
pub mod config;
pub mod deps;
pub mod engine;
pub mod error;
pub mod intercept;
pub mod registry;
pub mod snapshot;
pub mod value;
pub mod view;

pub use arrows::{ArrowManager, Color, Edge, EdgeId, FixedLayout, Layout, Rect, RoutingHints, Side};
pub use config::EngineConfig;
pub use deps::{Subscriber, SubscriberId};
pub use engine::{Engine, EngineBuilder};
pub use error::{CallError, Error, Result};
pub use intercept::{ApiSurface, Call, Observer};
pub use registry::{ObjectInfo, ObjectKind, ObjectRegistry};
pub use snapshot::DiagramSnapshot;
pub use value::{Handle, Value};
pub use view::{
    AnchorId, ReferenceKind, ReferenceList, SlotDescriptor, StateTableView, SyncMode, View, ViewRef,
};
