//! Object records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::intercept::ApiSurface;
use crate::value::Handle;
use crate::view::ViewRef;

/// What sort of API object a handle names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Buffer,
    Texture,
    Shader,
    Program,
    VertexArray,
    Framebuffer,
    Renderbuffer,
    Sampler,
}

impl ObjectKind {
    /// Prefix used for automatically generated names.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Buffer => "buffer",
            ObjectKind::Texture => "texture",
            ObjectKind::Shader => "shader",
            ObjectKind::Program => "program",
            ObjectKind::VertexArray => "vertexArray",
            ObjectKind::Framebuffer => "framebuffer",
            ObjectKind::Renderbuffer => "renderbuffer",
            ObjectKind::Sampler => "sampler",
        }
    }
}

/// Everything the engine knows about one API object.
///
/// Records are never removed: a deleted object stays resolvable with
/// `deleted == true` so late lookups do not dangle.
pub struct ObjectInfo<A: ApiSurface> {
    pub(crate) handle: Handle,
    pub(crate) kind: ObjectKind,
    pub(crate) name: String,
    pub(crate) created_order: u64,
    pub(crate) deleted: bool,
    pub(crate) bind_target: Option<u32>,
    pub(crate) view: Option<ViewRef<A>>,
}

impl<A: ApiSurface> ObjectInfo<A> {
    /// Create a record for a freshly created object. The creation order is
    /// assigned when the record is registered.
    pub fn new(handle: Handle, kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            handle,
            kind,
            name: name.into(),
            created_order: 0,
            deleted: false,
            bind_target: None,
            view: None,
        }
    }

    /// Attach the view that displays this object.
    pub fn with_view(mut self, view: ViewRef<A>) -> Self {
        self.view = Some(view);
        self
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_order(&self) -> u64 {
        self.created_order
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// First bind point the object was bound to, if recorded.
    pub fn bind_target(&self) -> Option<u32> {
        self.bind_target
    }

    /// The object's view. `None` once the object is deleted.
    pub fn view(&self) -> Option<&ViewRef<A>> {
        self.view.as_ref()
    }

    /// Whether new edges may point at this object.
    pub fn is_arrow_target(&self) -> bool {
        !self.deleted && self.view.is_some()
    }
}

impl<A: ApiSurface> Clone for ObjectInfo<A> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            kind: self.kind,
            name: self.name.clone(),
            created_order: self.created_order,
            deleted: self.deleted,
            bind_target: self.bind_target,
            view: self.view.clone(),
        }
    }
}

impl<A: ApiSurface> fmt::Debug for ObjectInfo<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInfo")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("created_order", &self.created_order)
            .field("deleted", &self.deleted)
            .field("bind_target", &self.bind_target)
            .field("has_view", &self.view.is_some())
            .finish()
    }
}
