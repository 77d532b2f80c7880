use crate::foundation::core::{Point, Rect};
use crate::mask::shape::ViewportShape;
use crate::render::layers::{DepthBand, SCENE_FALLBACK_LAYER};
use crate::viewport::content::ViewportContent;
use crate::viewport::effects::ViewportEffect;

fn default_layer() -> f64 {
    50.0
}

fn default_opacity() -> f64 {
    1.0
}

/// A shaped screen region hosting independently rendered, masked content.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportConfig {
    /// Host identifier, reported back by hit testing.
    pub id: String,
    pub shape: ViewportShape,
    #[serde(default)]
    pub content: ViewportContent,
    /// Applied in order.
    #[serde(default)]
    pub effects: Vec<ViewportEffect>,
    /// Continuous depth in `0..=100`; see [`DepthBand::from_layer`].
    #[serde(default = "default_layer")]
    pub layer: f64,
    /// Soft edge amount in `[0, 1]`; 0 is a hard cutout.
    #[serde(default)]
    pub edge_blend: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Screen position of the shape's bounding box top-left corner.
    pub position: Point,
}

impl ViewportConfig {
    pub fn new(id: impl Into<String>, shape: ViewportShape, position: Point) -> Self {
        Self {
            id: id.into(),
            shape,
            content: ViewportContent::None,
            effects: Vec::new(),
            layer: default_layer(),
            edge_blend: 0.0,
            opacity: 1.0,
            position,
        }
    }

    pub fn with_content(mut self, content: ViewportContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_effect(mut self, effect: ViewportEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_layer(mut self, layer: f64) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_edge_blend(mut self, edge_blend: f64) -> Self {
        self.edge_blend = edge_blend;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn band(&self) -> DepthBand {
        DepthBand::from_layer(self.layer)
    }

    /// Screen-space bounding box.
    pub fn screen_bounds(&self) -> Rect {
        self.shape.bounds() + self.position.to_vec2()
    }

    /// Analytic containment of a screen point.
    pub fn contains_screen(&self, p: Point) -> bool {
        self.shape.contains(p - self.position.to_vec2())
    }

    /// Layer with non-finite values mapped to the scene band's midpoint, for ordering.
    pub(crate) fn order_layer(&self) -> f64 {
        if self.layer.is_finite() {
            self.layer
        } else {
            SCENE_FALLBACK_LAYER
        }
    }
}
