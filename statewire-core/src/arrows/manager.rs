//! Arrow Manager
//!
//! Owns every live edge. Adding and removing are pure bookkeeping; the
//! screen-space curves are recomputed in `update`, which the embedding UI
//! calls after anything that moves anchors (drag, resize, expand/collapse).
//! Anchors never need to know which edges are attached to them.

use indexmap::IndexMap;

use super::color::Color;
use super::edge::{Edge, EdgeId, RoutingHints};
use super::geometry::{route, Layout};
use crate::config::RoutingConfig;
use crate::error::{Error, Result};
use crate::view::AnchorId;

/// The set of live edges, in creation order.
pub struct ArrowManager {
    edges: IndexMap<EdgeId, Edge>,
    routing: RoutingConfig,
}

impl ArrowManager {
    pub fn new(routing: RoutingConfig) -> Self {
        Self {
            edges: IndexMap::new(),
            routing,
        }
    }

    /// Add a directed edge. The path is computed on the next `update`.
    pub fn add(
        &mut self,
        source: AnchorId,
        target: AnchorId,
        color: Color,
        hints: RoutingHints,
    ) -> Result<EdgeId> {
        if source == target {
            return Err(Error::InvalidEdge("source and target anchors are the same"));
        }

        let id = EdgeId::next();
        self.edges.insert(
            id,
            Edge {
                id,
                source,
                target,
                color,
                hints,
                path: None,
            },
        );

        tracing::debug!(edge = id.raw(), ?source, ?target, "edge added");
        Ok(id)
    }

    /// Remove an edge. Unknown or already removed ids are ignored.
    ///
    /// Returns whether an edge was removed.
    pub fn remove(&mut self, id: EdgeId) -> bool {
        let removed = self.edges.shift_remove(&id).is_some();
        if removed {
            tracing::debug!(edge = id.raw(), "edge removed");
        }
        removed
    }

    /// Remove every edge pointing at an anchor. Returns how many went.
    pub fn remove_targeting(&mut self, target: AnchorId) -> usize {
        let before = self.edges.len();
        self.edges.retain(|_, edge| edge.target != target);
        let removed = before - self.edges.len();
        if removed > 0 {
            tracing::debug!(?target, removed, "removed edges to detached anchor");
        }
        removed
    }

    /// Point every edge arriving at `from` at `to` instead, keeping ids and
    /// colors. Paths are recomputed on the next `update`.
    pub fn retarget(&mut self, from: AnchorId, to: AnchorId) -> usize {
        let mut moved = 0;
        for edge in self.edges.values_mut().filter(|edge| edge.target == from) {
            edge.target = to;
            edge.path = None;
            moved += 1;
        }
        if moved > 0 {
            tracing::debug!(?from, ?to, moved, "retargeted edges");
        }
        moved
    }

    /// Recompute every live edge's curve from current anchor positions.
    ///
    /// Returns the number of edges that could be routed; edges with a
    /// hidden anchor are left without a path.
    pub fn update(&mut self, layout: &dyn Layout) -> usize {
        let mut routed = 0;
        for edge in self.edges.values_mut() {
            edge.path = match (layout.anchor_rect(edge.source), layout.anchor_rect(edge.target)) {
                (Some(source), Some(target)) => {
                    routed += 1;
                    Some(route(
                        source,
                        target,
                        edge.hints.start,
                        edge.hints.end,
                        &self.routing,
                    ))
                }
                _ => None,
            };
        }
        routed
    }

    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn contains(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Edges leaving an anchor.
    pub fn edges_from(&self, source: AnchorId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |edge| edge.source == source)
    }

    /// Edges arriving at an anchor.
    pub fn edges_to(&self, target: AnchorId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |edge| edge.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Default for ArrowManager {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}
