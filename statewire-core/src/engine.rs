//! The engine.
//!
//! [`Engine`] owns everything the diagram knows about the instrumented API:
//! the object registry, the dependency map, the edges and the observer table.
//! It is constructed explicitly and passed by reference to observers and
//! views; there is no global state.
//!
//! # Calls
//!
//! [`Engine::call`] is the proxy every API call goes through:
//!
//! 1. the original implementation runs exactly once with the caller's
//!    arguments;
//! 2. if it failed, the error is returned as [`CallError::Api`] and nothing
//!    else happens;
//! 3. otherwise each observer wrapped around the entry point runs, in wrap
//!    order;
//! 4. the original return value is handed back unchanged.
//!
//! # Re-entrancy
//!
//! Observers and views receive `&Engine` and may call back into it, including
//! making further intercepted calls. The engine never holds a `RefCell`
//! borrow across a callback: observer chains and subscriber lists are cloned
//! out first, then run with every borrow released.

use std::cell::{Ref, RefCell};
use std::fmt;

use crate::arrows::{ArrowManager, Color, EdgeId, Layout, RoutingHints};
use crate::config::EngineConfig;
use crate::deps::{DependencyMap, Subscriber, SubscriberId};
use crate::error::{CallError, Result};
use crate::intercept::{ApiSurface, Call, CallStack, Observer, ObserverTable};
use crate::registry::{ObjectInfo, ObjectKind, ObjectRegistry};
use crate::snapshot::DiagramSnapshot;
use crate::value::{Handle, Value};
use crate::view::{AnchorId, ReferenceKind, SyncMode, ViewRef};

/// Builder for [`Engine`].
pub struct EngineBuilder<A: ApiSurface> {
    api: A,
    config: EngineConfig,
}

impl<A: ApiSurface> EngineBuilder<A> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Log every intercepted call at debug level.
    pub fn trace_calls(mut self, enabled: bool) -> Self {
        self.config.trace_calls = enabled;
        self
    }

    pub fn build(self) -> Engine<A> {
        let registry = ObjectRegistry::new(
            &self.config.default_object_name,
            self.config.default_object_kind,
            None,
        );
        let arrows = ArrowManager::new(self.config.routing);

        Engine {
            api: RefCell::new(self.api),
            registry: RefCell::new(registry),
            deps: RefCell::new(DependencyMap::new()),
            arrows: RefCell::new(arrows),
            observers: RefCell::new(ObserverTable::new()),
            stack: CallStack::new(),
            pending_name: RefCell::new(None),
            flashes: RefCell::new(Vec::new()),
            config: self.config,
        }
    }
}

/// Call interception and view synchronization for one API instance.
pub struct Engine<A: ApiSurface> {
    api: RefCell<A>,
    config: EngineConfig,
    registry: RefCell<ObjectRegistry<A>>,
    deps: RefCell<DependencyMap<A>>,
    arrows: RefCell<ArrowManager>,
    observers: RefCell<ObserverTable<A>>,
    stack: CallStack,
    pending_name: RefCell<Option<String>>,
    flashes: RefCell<Vec<AnchorId>>,
}

impl<A: ApiSurface> Engine<A> {
    /// An engine with the default configuration.
    pub fn new(api: A) -> Self {
        Self::builder(api).build()
    }

    pub fn builder(api: A) -> EngineBuilder<A> {
        EngineBuilder {
            api,
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Call an entry point through the interception layer.
    pub fn call(&self, entry_point: &str, args: &[Value]) -> Result<Value, CallError<A::Error>> {
        let frame = self.stack.enter(entry_point);
        if self.config.trace_calls {
            tracing::debug!(entry_point, depth = frame.depth(), args = args.len(), "call");
        } else {
            tracing::trace!(entry_point, depth = frame.depth(), "call");
        }

        let ret = self
            .api
            .borrow_mut()
            .invoke(entry_point, args)
            .map_err(CallError::Api)?;

        let chain = self.observers.borrow().chain(entry_point);
        let call = Call {
            entry_point,
            args,
            ret: &ret,
        };
        for observer in &chain {
            observer.observe(self, &call)?;
        }

        Ok(ret)
    }

    /// Attach an observer to an entry point. Returns the chain length.
    pub fn wrap(&self, entry_point: &str, observer: Observer<A>) -> usize {
        self.observers.borrow_mut().wrap(entry_point, observer)
    }

    /// Treat `entry_point` as a creation call for objects of `kind`.
    pub fn track_creation<F>(&self, entry_point: &str, kind: ObjectKind, factory: F)
    where
        F: Fn(&Engine<A>, &str, Handle) -> Result<ViewRef<A>> + 'static,
    {
        self.wrap(entry_point, Observer::creation(kind, factory));
    }

    /// Treat `entry_point` as the deletion call paired with some creation.
    pub fn track_deletion(&self, entry_point: &str) {
        self.wrap(entry_point, Observer::deletion());
    }

    pub fn is_wrapped(&self, entry_point: &str) -> bool {
        self.observers.borrow().is_wrapped(entry_point)
    }

    /// Number of observers wrapped around an entry point.
    pub fn observer_count(&self, entry_point: &str) -> usize {
        self.observers.borrow().chain_len(entry_point)
    }

    /// Give the next created object this name instead of a generated one.
    pub fn set_pending_name(&self, name: impl Into<String>) {
        *self.pending_name.borrow_mut() = Some(name.into());
    }

    pub(crate) fn take_pending_name(&self) -> Option<String> {
        self.pending_name.borrow_mut().take()
    }

    /// Generated name for the next object of `kind`, e.g. `buffer3`.
    pub fn auto_name(&self, kind: ObjectKind) -> String {
        let count = self
            .registry
            .borrow()
            .iter()
            .filter(|info| !info.handle().is_default() && info.kind() == kind)
            .count();
        format!("{}{}", kind.label(), count + 1)
    }

    /// Number of intercepted calls currently executing.
    pub fn call_depth(&self) -> usize {
        self.stack.depth()
    }

    /// The innermost intercepted call currently executing.
    pub fn current_call(&self) -> Option<String> {
        self.stack.current()
    }

    pub fn total_calls(&self) -> u64 {
        self.stack.total_calls()
    }

    /// Subscribe to an entry point.
    ///
    /// The first subscription to an entry point also wraps it with the
    /// notifying observer. Returns `false` for a duplicate subscription.
    pub fn subscribe(&self, entry_point: &str, subscriber: &Subscriber<A>) -> bool {
        {
            let mut observers = self.observers.borrow_mut();
            if !observers.has_mutation_observer(entry_point) {
                observers.wrap(entry_point, Observer::mutation());
            }
        }
        self.deps.borrow_mut().subscribe(entry_point, subscriber)
    }

    /// Subscribe to several entry points. Returns how many were new.
    pub fn subscribe_all<S: AsRef<str>>(&self, entry_points: &[S], subscriber: &Subscriber<A>) -> usize {
        let mut added = 0;
        for entry_point in entry_points {
            if self.subscribe(entry_point.as_ref(), subscriber) {
                added += 1;
            }
        }
        added
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.deps.borrow_mut().unsubscribe(id);
    }

    /// Run every subscriber of an entry point, in subscription order.
    pub fn notify(&self, entry_point: &str) -> Result<()> {
        // Release the map before running anything; callbacks may subscribe.
        let callbacks = self.deps.borrow().subscribers_for(entry_point);

        for callback in callbacks {
            callback(self)?;
        }
        Ok(())
    }

    pub fn subscriber_count(&self, entry_point: &str) -> usize {
        self.deps.borrow().subscriber_count(entry_point)
    }

    /// Attach the view for the default object and populate it.
    ///
    /// Edges that pointed at a previous default view move to the new one.
    pub fn set_default_view(&self, view: ViewRef<A>) -> Result<()> {
        let previous = self
            .registry
            .borrow_mut()
            .attach_default_view(view.clone());
        if let Some(previous) = previous {
            self.arrows
                .borrow_mut()
                .retarget(previous.anchor(), view.anchor());
            previous.detach(self);
        }
        view.resync(self, SyncMode::Initial)
    }

    pub fn register_object(&self, info: ObjectInfo<A>) -> Result<()> {
        self.registry.borrow_mut().register(info).map(|_| ())
    }

    /// A copy of an object's record.
    pub fn lookup(&self, handle: Handle) -> Result<ObjectInfo<A>> {
        self.registry.borrow().lookup(handle).cloned()
    }

    /// Mark an object deleted, remove the edges pointing at its view and
    /// detach the view.
    pub fn delete_object(&self, handle: Handle) -> Result<()> {
        let view = self.registry.borrow_mut().mark_deleted(handle)?;

        if let Some(view) = view {
            {
                let mut arrows = self.arrows.borrow_mut();
                arrows.remove_targeting(view.anchor());
                for child in view.children() {
                    arrows.remove_targeting(child);
                }
            }
            view.detach(self);
        }
        Ok(())
    }

    pub fn set_bind_target(&self, handle: Handle, target: u32) -> Result<bool> {
        self.registry.borrow_mut().set_bind_target(handle, target)
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.registry.borrow().is_live(handle)
    }

    pub fn resolve_reference(&self, value: &Value, kind: ReferenceKind) -> Result<Option<Handle>> {
        self.registry.borrow().resolve_reference(value, kind)
    }

    pub fn format_reference(&self, value: &Value, kind: ReferenceKind) -> Result<String> {
        self.registry.borrow().format_reference(value, kind)
    }

    pub fn registry(&self) -> Ref<'_, ObjectRegistry<A>> {
        self.registry.borrow()
    }

    /// Draw an edge from `source` to the view of the object `target`.
    ///
    /// Returns `None` without drawing anything if the object is deleted or
    /// has no view.
    pub fn connect(&self, source: AnchorId, target: Handle, hints: RoutingHints) -> Result<Option<EdgeId>> {
        let (anchor, order) = {
            let registry = self.registry.borrow();
            let info = registry.lookup(target)?;
            if info.is_deleted() {
                tracing::debug!(%target, name = info.name(), "not drawing an edge to a deleted object");
                return Ok(None);
            }
            match info.view() {
                Some(view) => (view.anchor(), info.created_order()),
                None => return Ok(None),
            }
        };

        let color = Color::for_identity(order, &self.config.edge_color);
        self.arrows
            .borrow_mut()
            .add(source, anchor, color, hints)
            .map(Some)
    }

    /// Draw an edge to an anchor that is not an object, such as a texture
    /// unit row. The color derives from the anchor and never matches an
    /// object's color.
    pub fn connect_anchor(&self, source: AnchorId, target: AnchorId, hints: RoutingHints) -> Result<EdgeId> {
        let color = Color::for_anchor(target.raw(), &self.config.edge_color);
        self.arrows.borrow_mut().add(source, target, color, hints)
    }

    /// Remove an edge. Stale ids are ignored.
    pub fn disconnect(&self, edge: EdgeId) -> bool {
        self.arrows.borrow_mut().remove(edge)
    }

    /// Color of every edge pointing at an object.
    pub fn color_for(&self, handle: Handle) -> Result<Color> {
        let order = self.registry.borrow().lookup(handle)?.created_order();
        Ok(Color::for_identity(order, &self.config.edge_color))
    }

    /// Reroute every edge against the current layout.
    pub fn relayout(&self, layout: &dyn Layout) -> usize {
        self.arrows.borrow_mut().update(layout)
    }

    pub fn arrows(&self) -> Ref<'_, ArrowManager> {
        self.arrows.borrow()
    }

    /// Highlight an anchor whose displayed value changed.
    pub fn flash(&self, anchor: AnchorId) {
        self.flashes.borrow_mut().push(anchor);
    }

    /// Take every highlight raised since the last drain.
    pub fn drain_flashes(&self) -> Vec<AnchorId> {
        std::mem::take(&mut *self.flashes.borrow_mut())
    }

    pub fn pending_flashes(&self) -> usize {
        self.flashes.borrow().len()
    }

    /// Read access to the API, for queries that must not be intercepted.
    pub fn api(&self) -> Ref<'_, A> {
        self.api.borrow()
    }

    /// Mutable access to the API, bypassing interception.
    pub fn with_api_mut<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.api.borrow_mut())
    }

    /// Objects and edges, ready to hand to a renderer.
    pub fn snapshot(&self) -> DiagramSnapshot {
        DiagramSnapshot::capture(&self.registry.borrow(), &self.arrows.borrow())
    }
}

impl<A: ApiSurface> fmt::Debug for Engine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("objects", &self.registry.borrow().len())
            .field("edges", &self.arrows.borrow().len())
            .field("depth", &self.stack.depth())
            .finish_non_exhaustive()
    }
}
