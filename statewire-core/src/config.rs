//! Engine configuration.
//!
//! All fields have defaults, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::ObjectKind;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display name of the implicit default object.
    pub default_object_name: String,

    /// Kind of the implicit default object.
    pub default_object_kind: ObjectKind,

    pub edge_color: ColorConfig,

    pub routing: RoutingConfig,

    /// Log every intercepted call at debug level instead of trace.
    pub trace_calls: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_object_name: "*default*".to_owned(),
            default_object_kind: ObjectKind::VertexArray,
            edge_color: ColorConfig::default(),
            routing: RoutingConfig::default(),
            trace_calls: false,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Saturation and lightness shared by every edge color; only the hue
/// varies per target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            lightness: 0.8,
        }
    }
}

/// Shape of routed edge curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Minimum distance of a control point from its endpoint.
    pub min_bend: f32,

    /// Control point distance as a fraction of the horizontal span.
    pub bend_ratio: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            min_bend: 24.0,
            bend_ratio: 0.5,
        }
    }
}
