//! Relationships between views.
//!
//! An edge is a directed arrow from an anchor inside one view (a table
//! cell, a list row) to an anchor of another view (usually an object's name
//! element). The [`ArrowManager`] owns the live edge set; routing geometry
//! lives in [`geometry`] and the per-target color policy in [`Color`].

mod color;
mod edge;
pub mod geometry;
mod manager;

pub use color::Color;
pub use edge::{Edge, EdgeId, RoutingHints};
pub use geometry::{ArrowPath, FixedLayout, Layout, Point, Rect, Side};
pub use manager::ArrowManager;
