//! Object Registry
//!
//! Gives the opaque handles returned by the API a stable identity: a display
//! name, a creation order, a deletion flag, and the view that displays the
//! object.
//!
//! # Invariants
//!
//! - A handle is registered at most once. Re-registering a deleted handle is
//!   rejected, so once a lookup reports `deleted == true` it always will.
//! - The default object (`Handle::DEFAULT`) is present from construction and
//!   can never be deleted.
//! - Records are retained after deletion; only the view is detached.

mod object;

pub use object::{ObjectInfo, ObjectKind};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::intercept::ApiSurface;
use crate::value::{format_value, Handle, Value};
use crate::view::{ReferenceKind, ViewRef};

/// Registry of every object the engine has observed, in creation order.
pub struct ObjectRegistry<A: ApiSurface> {
    objects: IndexMap<Handle, ObjectInfo<A>>,
    next_order: u64,
}

impl<A: ApiSurface> ObjectRegistry<A> {
    /// Create a registry holding only the default object.
    pub fn new(default_name: &str, default_kind: ObjectKind, default_view: Option<ViewRef<A>>) -> Self {
        let mut default = ObjectInfo::new(Handle::DEFAULT, default_kind, default_name);
        default.view = default_view;

        let mut objects = IndexMap::new();
        objects.insert(Handle::DEFAULT, default);

        Self {
            objects,
            next_order: 1,
        }
    }

    /// Register a newly created object and assign its creation order.
    pub fn register(&mut self, mut info: ObjectInfo<A>) -> Result<&ObjectInfo<A>> {
        let handle = info.handle;
        if self.objects.contains_key(&handle) {
            return Err(Error::DuplicateHandle(handle));
        }

        info.created_order = self.next_order;
        info.deleted = false;
        self.next_order += 1;

        tracing::debug!(%handle, name = %info.name, kind = ?info.kind, "registered object");

        let (index, _) = self.objects.insert_full(handle, info);
        Ok(&self.objects[index])
    }

    /// Look up a handle. Deleted objects resolve with `deleted == true`.
    pub fn lookup(&self, handle: Handle) -> Result<&ObjectInfo<A>> {
        self.objects
            .get(&handle)
            .ok_or(Error::UnregisteredHandle(handle))
    }

    /// Mark an object deleted and detach its view.
    ///
    /// Returns the detached view, or `None` if the object was already
    /// deleted (deleting twice is harmless).
    pub fn mark_deleted(&mut self, handle: Handle) -> Result<Option<ViewRef<A>>> {
        if handle.is_default() {
            return Err(Error::DefaultObjectNotDeletable);
        }

        let info = self
            .objects
            .get_mut(&handle)
            .ok_or(Error::UnregisteredHandle(handle))?;

        if !info.deleted {
            tracing::debug!(%handle, name = %info.name, "object deleted");
        }
        info.deleted = true;
        Ok(info.view.take())
    }

    /// Attach the view for the default object, returning the previous one.
    pub fn attach_default_view(&mut self, view: ViewRef<A>) -> Option<ViewRef<A>> {
        self.objects
            .get_mut(&Handle::DEFAULT)
            .and_then(|info| info.view.replace(view))
    }

    /// Record the bind point an object was first bound to.
    ///
    /// Returns `true` if this call set it; later binds keep the first value.
    pub fn set_bind_target(&mut self, handle: Handle, target: u32) -> Result<bool> {
        let info = self
            .objects
            .get_mut(&handle)
            .ok_or(Error::UnregisteredHandle(handle))?;

        if info.bind_target.is_some() {
            return Ok(false);
        }
        info.bind_target = Some(target);
        Ok(true)
    }

    /// Map a queried raw value onto the object it references.
    ///
    /// A null value references nothing, except in `ObjectOrDefault` slots
    /// where it means the default object.
    pub fn resolve_reference(&self, value: &Value, kind: ReferenceKind) -> Result<Option<Handle>> {
        match value.as_handle() {
            Some(handle) => self.lookup(handle).map(|info| Some(info.handle)),
            None if kind == ReferenceKind::ObjectOrDefault && value.is_null() => {
                Ok(Some(Handle::DEFAULT))
            }
            None => Ok(None),
        }
    }

    /// Display string for a value held by a reference slot.
    pub fn format_reference(&self, value: &Value, kind: ReferenceKind) -> Result<String> {
        match self.resolve_reference(value, kind)? {
            Some(handle) => Ok(self.lookup(handle)?.name.clone()),
            None if value.is_null() => Ok("null".to_owned()),
            None => Ok(format_value(value)),
        }
    }

    /// Whether a handle is registered and not deleted.
    pub fn is_live(&self, handle: Handle) -> bool {
        self.objects.get(&handle).is_some_and(|info| !info.deleted)
    }

    /// All records, in creation order (default object first).
    pub fn iter(&self) -> impl Iterator<Item = &ObjectInfo<A>> {
        self.objects.values()
    }

    /// Number of records, including deleted ones and the default object.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects that have not been deleted.
    pub fn live_count(&self) -> usize {
        self.objects.values().filter(|info| !info.deleted).count()
    }
}
