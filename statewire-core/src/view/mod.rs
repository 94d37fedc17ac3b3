//! The view contract.
//!
//! A view is a panel that displays some slice of API state: one object, or a
//! group of global state. The engine never owns a view's lifecycle. It holds
//! an `Rc` so it can ask the view to resync and find its anchor.
//!
//! # Resync
//!
//! `resync` re-queries the live API, compares each freshly formatted value
//! with what the view last displayed, and updates only what changed. With
//! [`SyncMode::Initial`] the view populates itself without raising any
//! change highlight.

mod reference_list;
mod slot;
mod state_table;

pub use reference_list::ReferenceList;
pub use slot::{Formatter, ReferenceKind, ReferenceSlot, SlotCell, SlotDescriptor};
pub use state_table::{QueryFn, StateTableView};

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::Engine;
use crate::error::Result;
use crate::intercept::ApiSurface;

/// An element of a view that edges attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(u64);

impl AnchorId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a view is resyncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// First population after the view is created. Never flashes.
    Initial,
    /// A subscribed entry point ran.
    Update,
}

impl SyncMode {
    pub fn is_initial(self) -> bool {
        self == SyncMode::Initial
    }
}

/// A panel kept in sync with live API state.
pub trait View<A: ApiSurface> {
    /// Re-query state and update whatever changed.
    fn resync(&self, engine: &Engine<A>, mode: SyncMode) -> Result<()>;

    /// The element edges pointing at this view attach to.
    fn anchor(&self) -> AnchorId;

    /// Anchors inside the view that may also receive edges, such as rows.
    fn children(&self) -> Vec<AnchorId> {
        Vec::new()
    }

    /// Called once when the object behind the view is deleted. The view
    /// should drop any edges it owns.
    fn detach(&self, _engine: &Engine<A>) {}
}

pub type ViewRef<A> = Rc<dyn View<A>>;
