//! Edge colors.
//!
//! All edges that point at the same target share one color. The hue comes
//! from the target's identity, stepped by the golden-ratio conjugate so that
//! consecutive identities land far apart on the color wheel.

use std::fmt;

use serde::Serialize;

use crate::config::ColorConfig;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// An HSL color with every component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Color {
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue: hue.rem_euclid(1.0),
            saturation: saturation.clamp(0.0, 1.0),
            lightness: lightness.clamp(0.0, 1.0),
        }
    }

    /// Stable color for an identity key.
    pub fn for_identity(key: u64, config: &ColorConfig) -> Self {
        let hue = (key as f64 * GOLDEN_RATIO_CONJUGATE).fract() as f32;
        Self::hsl(hue, config.saturation, config.lightness)
    }

    /// Stable color for an anchor that is not an object.
    ///
    /// Anchor keys sit half a step off the object sequence, so an anchor
    /// hue never coincides with an object hue.
    pub fn for_anchor(key: u64, config: &ColorConfig) -> Self {
        let hue = ((key as f64 + 0.5) * GOLDEN_RATIO_CONJUGATE).fract() as f32;
        Self::hsl(hue, config.saturation, config.lightness)
    }

    /// CSS `hsl()` notation.
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            (self.hue * 360.0) as u32,
            (self.saturation * 100.0) as u32,
            (self.lightness * 100.0) as u32,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
