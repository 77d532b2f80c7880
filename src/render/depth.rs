//! Scalar paint order.
//!
//! World items use `layer * LAYER_STRIDE + screen_y`. Screen-Y is clamped to half a stride, so a
//! higher layer always paints after a lower one whatever the screen positions, and within a layer
//! lower rows paint first. UI items live above every world layer, ordered by their explicit `z`.

use std::cmp::Ordering;

use crate::render::layers::SCENE_FALLBACK_LAYER;

/// Key spacing between world layers; must exceed any screen-Y range.
pub const LAYER_STRIDE: f64 = 1_000_000.0;
/// Start of the reserved UI band.
pub const UI_BAND_BASE: f64 = 1e15;
/// Per-level nudge so stacked tiles in one column paint bottom-up.
pub const HEIGHT_BIAS: f64 = 0.01;
/// Entities paint over tiles sharing their row and height.
pub const ENTITY_BIAS: f64 = HEIGHT_BIAS / 2.0;
/// World layers and flat z values are clamped to `±WORLD_LAYER_LIMIT`. Keys then stay below
/// 1e12, where an f64 step is still far finer than `ENTITY_BIAS`.
pub const WORLD_LAYER_LIMIT: i32 = 1_000_000;

const MAX_SCREEN_Y: f64 = LAYER_STRIDE / 2.0 - 1.0;

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct DepthKey(f64);

impl DepthKey {
    /// World item on `layer` whose ground point projects to `screen_y`.
    pub fn iso(layer: i32, screen_y: f64) -> Self {
        let y = if screen_y.is_finite() {
            screen_y.clamp(-MAX_SCREEN_Y, MAX_SCREEN_Y)
        } else {
            0.0
        };
        Self(layer_base(layer) + y)
    }

    /// World item standing `height` levels above its ground row.
    pub fn iso_stacked(layer: i32, ground_screen_y: f64, height: f64) -> Self {
        let h = if height.is_finite() { height } else { 0.0 };
        Self::iso(layer, ground_screen_y + h * HEIGHT_BIAS)
    }

    /// UI element or screen primitive.
    pub fn ui(z: i32) -> Self {
        Self(UI_BAND_BASE + f64::from(z.clamp(-WORLD_LAYER_LIMIT, WORLD_LAYER_LIMIT)))
    }

    /// Legacy world-space command: `z` acts as a whole layer.
    pub fn flat(z: i32) -> Self {
        Self(layer_base(z))
    }

    /// Viewports order among themselves by their continuous layer.
    pub fn viewport(layer: f64) -> Self {
        let layer = if layer.is_finite() { layer } else { SCENE_FALLBACK_LAYER };
        Self(layer * LAYER_STRIDE)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

fn layer_base(layer: i32) -> f64 {
    f64::from(layer.clamp(-WORLD_LAYER_LIMIT, WORLD_LAYER_LIMIT)) * LAYER_STRIDE
}

impl PartialEq for DepthKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DepthKey {}

impl PartialOrd for DepthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DepthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/depth.rs"]
mod tests;
