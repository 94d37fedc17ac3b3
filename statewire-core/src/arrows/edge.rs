//! Edge types.

use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use super::color::Color;
use super::geometry::{ArrowPath, Side};
use crate::view::AnchorId;

/// Identity token for one edge.
///
/// Ids are never reused, so a stale id held by a view can be passed to
/// `remove` safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u64);

impl EdgeId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// How an edge should be drawn. Unset sides are chosen automatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingHints {
    pub start: Option<Side>,
    pub end: Option<Side>,
    /// Dash pattern (dash, gap, ...). Empty for a solid line.
    pub dash: SmallVec<[f32; 2]>,
}

impl RoutingHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, side: Side) -> Self {
        self.start = Some(side);
        self
    }

    pub fn end(mut self, side: Side) -> Self {
        self.end = Some(side);
        self
    }

    pub fn dashed(mut self, dash: f32, gap: f32) -> Self {
        self.dash = SmallVec::from_slice(&[dash, gap]);
        self
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

/// A directed visual connection between two anchors.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) source: AnchorId,
    pub(crate) target: AnchorId,
    pub(crate) color: Color,
    pub(crate) hints: RoutingHints,
    /// Routed curve. `None` until the next layout pass, or while either
    /// anchor is not visible.
    pub(crate) path: Option<ArrowPath>,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> AnchorId {
        self.source
    }

    pub fn target(&self) -> AnchorId {
        self.target
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn hints(&self) -> &RoutingHints {
        &self.hints
    }

    pub fn path(&self) -> Option<&ArrowPath> {
        self.path.as_ref()
    }
}
