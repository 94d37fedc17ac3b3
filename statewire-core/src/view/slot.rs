//! Slot helpers shared by views.
//!
//! A slot is one displayed state value: a row in a state table, say
//! `ARRAY_BUFFER_BINDING`. [`SlotCell`] remembers what the slot last showed
//! so a resync can tell whether anything changed. [`ReferenceSlot`] owns the
//! single edge a reference-valued slot draws to the object it names.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::arrows::{EdgeId, RoutingHints, Side};
use crate::engine::Engine;
use crate::error::Result;
use crate::intercept::ApiSurface;
use crate::value::{format_value, Handle, Value};
use crate::view::AnchorId;

/// Turns a queried raw value into display text.
pub type Formatter = Rc<dyn Fn(&Value) -> String>;

/// How a reference-valued slot interprets its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A handle or null. Null draws no edge.
    Object,
    /// A handle, or null meaning the default object.
    ObjectOrDefault,
}

/// Static description of one displayed slot.
#[derive(Clone)]
pub struct SlotDescriptor {
    pname: String,
    setters: SmallVec<[String; 2]>,
    formatter: Option<Formatter>,
    reference: Option<ReferenceKind>,
    hints: RoutingHints,
}

impl SlotDescriptor {
    pub fn new(pname: impl Into<String>) -> Self {
        Self {
            pname: pname.into(),
            setters: SmallVec::new(),
            formatter: None,
            reference: None,
            hints: RoutingHints::new().start(Side::Right),
        }
    }

    /// Add an entry point that can change this slot.
    pub fn setter(mut self, entry_point: impl Into<String>) -> Self {
        self.setters.push(entry_point.into());
        self
    }

    pub fn formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + 'static,
    {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    /// Mark the slot as holding an object reference. Reference slots are
    /// displayed by object name and draw an edge to the object.
    pub fn reference(mut self, kind: ReferenceKind) -> Self {
        self.reference = Some(kind);
        self
    }

    pub fn hints(mut self, hints: RoutingHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn pname(&self) -> &str {
        &self.pname
    }

    pub fn setters(&self) -> &[String] {
        &self.setters
    }

    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        self.reference
    }

    pub fn routing_hints(&self) -> &RoutingHints {
        &self.hints
    }

    pub fn produces_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Display text for a non-reference value.
    pub fn format(&self, value: &Value) -> String {
        match &self.formatter {
            Some(formatter) => formatter(value),
            None => format_value(value),
        }
    }

    /// Display text for any value, resolving references by object name.
    pub fn display<A: ApiSurface>(&self, engine: &Engine<A>, value: &Value) -> Result<String> {
        match self.reference {
            Some(kind) => engine.format_reference(value, kind),
            None => Ok(self.format(value)),
        }
    }
}

impl fmt::Debug for SlotDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDescriptor")
            .field("pname", &self.pname)
            .field("setters", &self.setters)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// The last value a slot displayed.
#[derive(Debug)]
pub struct SlotCell {
    anchor: AnchorId,
    displayed: RefCell<Option<String>>,
}

impl SlotCell {
    pub fn new() -> Self {
        Self {
            anchor: AnchorId::new(),
            displayed: RefCell::new(None),
        }
    }

    pub fn anchor(&self) -> AnchorId {
        self.anchor
    }

    pub fn displayed(&self) -> Option<String> {
        self.displayed.borrow().clone()
    }

    /// Store `display` if it differs from what is shown.
    ///
    /// Returns `true` if the cell changed.
    pub fn replace(&self, display: String) -> bool {
        let mut displayed = self.displayed.borrow_mut();
        if displayed.as_deref() == Some(display.as_str()) {
            return false;
        }
        *displayed = Some(display);
        true
    }
}

impl Default for SlotCell {
    fn default() -> Self {
        Self::new()
    }
}

/// The one edge a reference slot draws.
///
/// The edge is keyed on the target handle: reconciling with the same target
/// leaves it alone, a different target replaces it.
#[derive(Debug)]
pub struct ReferenceSlot {
    source: AnchorId,
    hints: RoutingHints,
    rendered: Cell<Option<Handle>>,
    edge: Cell<Option<EdgeId>>,
}

impl ReferenceSlot {
    pub fn new(source: AnchorId, hints: RoutingHints) -> Self {
        Self {
            source,
            hints,
            rendered: Cell::new(None),
            edge: Cell::new(None),
        }
    }

    /// Point the slot at `target`.
    ///
    /// Returns `true` if the target changed. Deleted targets and objects
    /// without a view get no edge. An unchanged target whose edge is missing
    /// is connected again, so the edge appears once the object has a view.
    pub fn reconcile<A: ApiSurface>(&self, engine: &Engine<A>, target: Option<Handle>) -> Result<bool> {
        let changed = self.rendered.get() != target;
        if !changed && self.edge_is_current(engine) {
            return Ok(false);
        }

        if let Some(edge) = self.edge.take() {
            engine.disconnect(edge);
        }
        self.rendered.set(target);

        if let Some(handle) = target {
            self.edge.set(engine.connect(self.source, handle, self.hints.clone())?);
        }
        Ok(changed)
    }

    fn edge_is_current<A: ApiSurface>(&self, engine: &Engine<A>) -> bool {
        match self.edge.get() {
            Some(edge) => engine.arrows().contains(edge),
            None => self.rendered.get().is_none(),
        }
    }

    /// Drop the edge and forget the target.
    pub fn clear<A: ApiSurface>(&self, engine: &Engine<A>) {
        if let Some(edge) = self.edge.take() {
            engine.disconnect(edge);
        }
        self.rendered.set(None);
    }

    pub fn source(&self) -> AnchorId {
        self.source
    }

    pub fn target(&self) -> Option<Handle> {
        self.rendered.get()
    }

    pub fn edge(&self) -> Option<EdgeId> {
        self.edge.get()
    }
}
