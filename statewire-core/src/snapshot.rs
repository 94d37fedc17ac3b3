//! Diagram snapshots.
//!
//! A plain-data copy of the registry and the edge set, for handing to an
//! external renderer. JSON is meant for inspection and tests, MessagePack for
//! shipping frames to a renderer process.

use serde::{Deserialize, Serialize};

use crate::arrows::ArrowManager;
use crate::error::Result;
use crate::intercept::ApiSurface;
use crate::registry::{ObjectKind, ObjectRegistry};
use crate::value::Handle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub handle: Handle,
    pub name: String,
    pub kind: ObjectKind,
    pub created_order: u64,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_target: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    /// CSS color, e.g. `hsl(222, 100%, 80%)`.
    pub color: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dash: Vec<f32>,
    /// SVG path data. Absent until the edge has been routed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub objects: Vec<ObjectSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl DiagramSnapshot {
    pub fn capture<A: ApiSurface>(registry: &ObjectRegistry<A>, arrows: &ArrowManager) -> Self {
        let objects = registry
            .iter()
            .map(|info| ObjectSnapshot {
                handle: info.handle(),
                name: info.name().to_owned(),
                kind: info.kind(),
                created_order: info.created_order(),
                deleted: info.is_deleted(),
                bind_target: info.bind_target(),
            })
            .collect();

        let edges = arrows
            .iter()
            .map(|edge| EdgeSnapshot {
                id: edge.id().raw(),
                source: edge.source().raw(),
                target: edge.target().raw(),
                color: edge.color().to_css(),
                dash: edge.hints().dash.to_vec(),
                path: edge.path().map(|path| path.to_svg()),
            })
            .collect();

        Self { objects, edges }
    }

    /// Objects that have not been deleted.
    pub fn live_objects(&self) -> impl Iterator<Item = &ObjectSnapshot> {
        self.objects.iter().filter(|object| !object.deleted)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// MessagePack with field names, so the renderer can decode it as a map.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}
