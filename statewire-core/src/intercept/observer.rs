//! Post-call observers.
//!
//! An observer runs after the original implementation of an entry point has
//! returned successfully. It sees the arguments and the return value but can
//! neither change them nor prevent them from reaching the caller.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::intercept::ApiSurface;
use crate::registry::{ObjectInfo, ObjectKind};
use crate::value::{Handle, Value};
use crate::view::{SyncMode, ViewRef};

/// One completed call, as seen by its observers.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub entry_point: &'a str,
    pub args: &'a [Value],
    pub ret: &'a Value,
}

impl<'a> Call<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// The handle passed at `index`, if that argument is a handle.
    pub fn handle_arg(&self, index: usize) -> Option<Handle> {
        self.arg(index).and_then(Value::as_handle)
    }
}

pub type ObserverFn<A> = Rc<dyn Fn(&Engine<A>, &Call<'_>) -> Result<()>>;

/// Builds the view for a newly created object from its name and handle.
pub type ViewFactory<A> = Rc<dyn Fn(&Engine<A>, &str, Handle) -> Result<ViewRef<A>>>;

/// The shape of an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    /// Registers the returned handle as a new object.
    Creation(ObjectKind),
    /// Marks the handle argument deleted.
    Deletion,
    /// Notifies the entry point's subscribers.
    Mutation,
    Custom,
}

pub struct Observer<A: ApiSurface> {
    kind: ObserverKind,
    run: ObserverFn<A>,
}

impl<A: ApiSurface> Observer<A> {
    /// An arbitrary post-call hook.
    pub fn custom<F>(run: F) -> Self
    where
        F: Fn(&Engine<A>, &Call<'_>) -> Result<()> + 'static,
    {
        Self {
            kind: ObserverKind::Custom,
            run: Rc::new(run),
        }
    }

    /// Registers the handle returned by the call, builds its view with
    /// `factory`, and runs the view's initial resync.
    ///
    /// The object is named from the engine's pending name if one was set,
    /// otherwise `<kind><n>`. A handle that is already registered fails
    /// before the name is taken or a view is built.
    pub fn creation<F>(kind: ObjectKind, factory: F) -> Self
    where
        F: Fn(&Engine<A>, &str, Handle) -> Result<ViewRef<A>> + 'static,
    {
        let factory: ViewFactory<A> = Rc::new(factory);
        Self {
            kind: ObserverKind::Creation(kind),
            run: Rc::new(move |engine: &Engine<A>, call: &Call<'_>| {
                let handle = call.ret.as_handle().ok_or_else(|| Error::ExpectedHandle {
                    entry_point: call.entry_point.to_owned(),
                    found: call.ret.kind_name(),
                })?;
                if engine.lookup(handle).is_ok() {
                    return Err(Error::DuplicateHandle(handle));
                }

                let name = engine
                    .take_pending_name()
                    .unwrap_or_else(|| engine.auto_name(kind));
                let view = factory(engine, &name, handle)?;

                engine.register_object(ObjectInfo::new(handle, kind, name).with_view(Rc::clone(&view)))?;
                view.resync(engine, SyncMode::Initial)
            }),
        }
    }

    /// Marks the first argument's handle deleted and detaches its view.
    /// A null argument is ignored, as the API itself ignores it.
    pub fn deletion() -> Self {
        Self {
            kind: ObserverKind::Deletion,
            run: Rc::new(|engine: &Engine<A>, call: &Call<'_>| match call.arg(0) {
                Some(Value::Handle(handle)) => engine.delete_object(*handle),
                Some(value) if value.is_null() => Ok(()),
                _ => Err(Error::MissingHandleArgument {
                    entry_point: call.entry_point.to_owned(),
                }),
            }),
        }
    }

    /// Runs every subscriber of the called entry point.
    pub fn mutation() -> Self {
        Self {
            kind: ObserverKind::Mutation,
            run: Rc::new(|engine: &Engine<A>, call: &Call<'_>| engine.notify(call.entry_point)),
        }
    }

    pub fn kind(&self) -> ObserverKind {
        self.kind
    }

    pub(crate) fn observe(&self, engine: &Engine<A>, call: &Call<'_>) -> Result<()> {
        (self.run)(engine, call)
    }
}

impl<A: ApiSurface> Clone for Observer<A> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            run: Rc::clone(&self.run),
        }
    }
}

impl<A: ApiSurface> fmt::Debug for Observer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer").field("kind", &self.kind).finish()
    }
}

/// Observer chain for one entry point, in wrap order.
pub type Chain<A> = SmallVec<[Observer<A>; 2]>;

/// Entry point → observers.
///
/// Wrapping an entry point twice composes: both observers run, in the order
/// they were added.
pub struct ObserverTable<A: ApiSurface> {
    chains: HashMap<String, Chain<A>>,
}

impl<A: ApiSurface> ObserverTable<A> {
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }

    /// Append an observer. Returns the new chain length.
    pub fn wrap(&mut self, entry_point: &str, observer: Observer<A>) -> usize {
        let chain = self.chains.entry(entry_point.to_owned()).or_default();
        chain.push(observer);
        chain.len()
    }

    /// Clone of the chain for an entry point (empty if unwrapped).
    pub fn chain(&self, entry_point: &str) -> Chain<A> {
        self.chains.get(entry_point).cloned().unwrap_or_default()
    }

    pub fn is_wrapped(&self, entry_point: &str) -> bool {
        self.chains.get(entry_point).is_some_and(|chain| !chain.is_empty())
    }

    /// Whether the entry point already notifies its subscribers.
    pub fn has_mutation_observer(&self, entry_point: &str) -> bool {
        self.chains.get(entry_point).is_some_and(|chain| {
            chain
                .iter()
                .any(|observer| observer.kind == ObserverKind::Mutation)
        })
    }

    pub fn chain_len(&self, entry_point: &str) -> usize {
        self.chains.get(entry_point).map_or(0, SmallVec::len)
    }

    /// Names of every wrapped entry point, sorted.
    pub fn wrapped_entry_points(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.chains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<A: ApiSurface> Default for ObserverTable<A> {
    fn default() -> Self {
        Self::new()
    }
}
