//! Reference lists.
//!
//! Some views show a list of objects rather than a single reference, for
//! example the shaders attached to a program. Each entry gets its own row
//! anchor and its own edge. Reconciling against a new list removes the
//! entries that went away before adding the ones that appeared, so an
//! unchanged entry keeps its edge.

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::arrows::{EdgeId, RoutingHints, Side};
use crate::engine::Engine;
use crate::error::Result;
use crate::intercept::ApiSurface;
use crate::value::Handle;
use crate::view::{AnchorId, SyncMode};

#[derive(Debug, Clone, Copy)]
struct Entry {
    anchor: AnchorId,
    edge: Option<EdgeId>,
}

#[derive(Debug)]
pub struct ReferenceList {
    hints: RoutingHints,
    entries: RefCell<IndexMap<Handle, Entry>>,
}

impl ReferenceList {
    pub fn new() -> Self {
        Self::with_hints(RoutingHints::new().start(Side::Right))
    }

    pub fn with_hints(hints: RoutingHints) -> Self {
        Self {
            hints,
            entries: RefCell::new(IndexMap::new()),
        }
    }

    /// Make the list match `targets`.
    ///
    /// Returns `true` if any entry was added or removed. New entries are
    /// flashed unless this is the initial pass. Kept entries whose edge is
    /// missing are connected again.
    pub fn reconcile<A: ApiSurface>(
        &self,
        engine: &Engine<A>,
        targets: &[Handle],
        mode: SyncMode,
    ) -> Result<bool> {
        let removed: Vec<Entry> = {
            let mut entries = self.entries.borrow_mut();
            let stale: Vec<Handle> = entries
                .keys()
                .filter(|handle| !targets.contains(handle))
                .copied()
                .collect();
            stale
                .iter()
                .filter_map(|handle| entries.shift_remove(handle))
                .collect()
        };
        for entry in &removed {
            if let Some(edge) = entry.edge {
                engine.disconnect(edge);
            }
        }

        let mut added = 0;
        for &handle in targets {
            let existing = self.entries.borrow().get(&handle).copied();
            if let Some(entry) = existing {
                if !entry.edge.is_some_and(|edge| engine.arrows().contains(edge)) {
                    let edge = engine.connect(entry.anchor, handle, self.hints.clone())?;
                    if let Some(entry) = self.entries.borrow_mut().get_mut(&handle) {
                        entry.edge = edge;
                    }
                }
                continue;
            }
            let anchor = AnchorId::new();
            let edge = engine.connect(anchor, handle, self.hints.clone())?;
            self.entries.borrow_mut().insert(handle, Entry { anchor, edge });
            if !mode.is_initial() {
                engine.flash(anchor);
            }
            added += 1;
        }

        Ok(added > 0 || !removed.is_empty())
    }

    /// Remove every entry and its edge.
    pub fn clear<A: ApiSurface>(&self, engine: &Engine<A>) {
        let drained: Vec<Entry> = self.entries.borrow_mut().drain(..).map(|(_, entry)| entry).collect();
        for edge in drained.into_iter().filter_map(|entry| entry.edge) {
            engine.disconnect(edge);
        }
    }

    /// Handles in display order.
    pub fn handles(&self) -> Vec<Handle> {
        self.entries.borrow().keys().copied().collect()
    }

    pub fn anchors(&self) -> Vec<AnchorId> {
        self.entries.borrow().values().map(|entry| entry.anchor).collect()
    }

    pub fn edge_for(&self, handle: Handle) -> Option<EdgeId> {
        self.entries.borrow().get(&handle).and_then(|entry| entry.edge)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for ReferenceList {
    fn default() -> Self {
        Self::new()
    }
}
