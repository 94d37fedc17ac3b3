//! State Table View
//!
//! A table of state slots, one row per slot. This is the view used for
//! groups of global state (clear color, blend state, buffer bindings) and for
//! per-object parameter tables.
//!
//! # How a resync works
//!
//! 1. Each row's value is queried from the live API through the query
//!    closure supplied by the catalog.
//! 2. The value is formatted and compared with the row's last displayed
//!    text. A row that changed is updated and, outside the initial pass,
//!    flashed.
//! 3. Reference rows reconcile their edge on the resolved handle, so the
//!    edge is only recreated when the target object actually changes.
//!
//! # Lifetime
//!
//! The resync callback the table subscribes holds only a weak reference to
//! the table. Dropping the last `Rc` to the view turns the callback into a
//! no-op instead of keeping the view alive through the dependency map.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::slot::{ReferenceSlot, SlotCell, SlotDescriptor};
use super::{AnchorId, SyncMode, View};
use crate::arrows::EdgeId;
use crate::deps::{Subscriber, SubscriberId};
use crate::engine::Engine;
use crate::error::Result;
use crate::intercept::ApiSurface;
use crate::value::Value;

/// Fetches the live raw value for a slot.
pub type QueryFn<A> = Rc<dyn Fn(&Engine<A>, &SlotDescriptor) -> Value>;

struct Row {
    descriptor: SlotDescriptor,
    cell: SlotCell,
    reference: Option<ReferenceSlot>,
}

pub struct StateTableView<A: ApiSurface> {
    title: String,
    anchor: AnchorId,
    rows: Vec<Row>,
    query: QueryFn<A>,
    subscriber: Cell<Option<SubscriberId>>,
    resyncs: Cell<usize>,
    detached: Cell<bool>,
}

impl<A: ApiSurface> StateTableView<A> {
    pub fn new<Q>(title: impl Into<String>, descriptors: Vec<SlotDescriptor>, query: Q) -> Rc<Self>
    where
        Q: Fn(&Engine<A>, &SlotDescriptor) -> Value + 'static,
    {
        let rows = descriptors
            .into_iter()
            .map(|descriptor| {
                let cell = SlotCell::new();
                let reference = descriptor
                    .produces_reference()
                    .then(|| ReferenceSlot::new(cell.anchor(), descriptor.routing_hints().clone()));
                Row {
                    descriptor,
                    cell,
                    reference,
                }
            })
            .collect();

        Rc::new(Self {
            title: title.into(),
            anchor: AnchorId::new(),
            rows,
            query: Rc::new(query),
            subscriber: Cell::new(None),
            resyncs: Cell::new(0),
            detached: Cell::new(false),
        })
    }

    /// Subscribe the table's resync to every setter of every row.
    pub fn bind(self: &Rc<Self>, engine: &Engine<A>) -> Subscriber<A> {
        let weak: Weak<Self> = Rc::downgrade(self);
        let title = self.title.clone();
        let subscriber = Subscriber::new(move |engine: &Engine<A>| match weak.upgrade() {
            Some(view) => view.resync(engine, SyncMode::Update),
            None => {
                tracing::warn!(view = %title, "resync callback outlived its view");
                Ok(())
            }
        });

        for row in &self.rows {
            engine.subscribe_all(row.descriptor.setters(), &subscriber);
        }
        self.subscriber.set(Some(subscriber.id()));
        subscriber
    }

    /// Bind, then populate the table.
    pub fn mount(self: &Rc<Self>, engine: &Engine<A>) -> Result<Subscriber<A>> {
        let subscriber = self.bind(engine);
        self.resync(engine, SyncMode::Initial)?;
        Ok(subscriber)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn row(&self, pname: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.descriptor.pname() == pname)
    }

    /// Text currently displayed for a slot.
    pub fn displayed(&self, pname: &str) -> Option<String> {
        self.row(pname).and_then(|row| row.cell.displayed())
    }

    pub fn row_anchor(&self, pname: &str) -> Option<AnchorId> {
        self.row(pname).map(|row| row.cell.anchor())
    }

    /// The edge a reference slot currently draws.
    pub fn edge_for(&self, pname: &str) -> Option<EdgeId> {
        self.row(pname)
            .and_then(|row| row.reference.as_ref())
            .and_then(ReferenceSlot::edge)
    }

    /// Number of resyncs run, initial pass included.
    pub fn resync_count(&self) -> usize {
        self.resyncs.get()
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }
}

impl<A: ApiSurface> View<A> for StateTableView<A> {
    fn resync(&self, engine: &Engine<A>, mode: SyncMode) -> Result<()> {
        if self.detached.get() {
            return Ok(());
        }
        self.resyncs.set(self.resyncs.get() + 1);

        for row in &self.rows {
            let raw = (self.query)(engine, &row.descriptor);
            let display = row.descriptor.display(engine, &raw)?;

            if row.cell.replace(display) && !mode.is_initial() {
                engine.flash(row.cell.anchor());
            }

            if let (Some(kind), Some(slot)) = (row.descriptor.reference_kind(), &row.reference) {
                let target = engine.resolve_reference(&raw, kind)?;
                slot.reconcile(engine, target)?;
            }
        }
        Ok(())
    }

    fn anchor(&self) -> AnchorId {
        self.anchor
    }

    fn children(&self) -> Vec<AnchorId> {
        self.rows.iter().map(|row| row.cell.anchor()).collect()
    }

    fn detach(&self, engine: &Engine<A>) {
        if self.detached.replace(true) {
            return;
        }
        for slot in self.rows.iter().filter_map(|row| row.reference.as_ref()) {
            slot.clear(engine);
        }
        if let Some(id) = self.subscriber.take() {
            engine.unsubscribe(id);
        }
    }
}

impl<A: ApiSurface> fmt::Debug for StateTableView<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTableView")
            .field("title", &self.title)
            .field("anchor", &self.anchor)
            .field("rows", &self.rows.len())
            .field("detached", &self.detached.get())
            .finish()
    }
}
