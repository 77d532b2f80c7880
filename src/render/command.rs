use crate::foundation::core::{Point, Rect, Rgba8Premul, Vec2};
use crate::foundation::error::{IsoError, IsoResult};
use crate::transform::iso::{TileCoord, TilePos};
use crate::viewport::config::ViewportConfig;

fn default_line_width() -> f64 {
    1.0
}

fn default_text_size() -> f32 {
    14.0
}

/// One per-frame draw request. Produced by the host, consumed by a single render pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    IsoTile(IsoTile),
    IsoEntity(IsoEntity),
    Ui(UiElement),
    Primitive(ScreenPrimitive),
    FlatRect(FlatRect),
    FlatSprite(FlatSprite),
    Viewport(ViewportConfig),
    /// A kind this renderer does not understand. Skipped with a diagnostic.
    #[serde(other)]
    Unknown,
}

/// Ground or stacked terrain tile.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IsoTile {
    pub tile: TileCoord,
    pub height: i32,
    pub layer: i32,
    pub sprite: Option<String>,
    /// Sheet frame for a tile sprite.
    pub frame: u32,
    /// Flat diamond color when no sprite is given.
    pub color: Option<Rgba8Premul>,
}

/// Moving object on the map. `offset` is a sub-tile displacement in tile units.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IsoEntity {
    /// Host id; enables per-entity animation tracking.
    pub entity: Option<u64>,
    pub tile: TileCoord,
    pub offset: Vec2,
    pub height: f64,
    pub layer: i32,
    pub sprite: Option<String>,
    pub animation: Option<String>,
    /// Sheet frame used when no animation is playing.
    pub frame: u32,
    pub color: Option<Rgba8Premul>,
}

/// UI panel in normalized screen fractions (`0..1` on both axes).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UiElement {
    pub rect: Rect,
    #[serde(default)]
    pub z: i32,
    #[serde(default)]
    pub color: Option<Rgba8Premul>,
    #[serde(default)]
    pub sprite: Option<String>,
}

/// Screen-space shape drawn over everything else.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenPrimitive {
    pub shape: PrimitiveShape,
    pub color: Rgba8Premul,
    #[serde(default)]
    pub z: i32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrimitiveShape {
    Line {
        from: Point,
        to: Point,
        #[serde(default = "default_line_width")]
        width: f64,
    },
    /// Filled when `stroke` is `None`, otherwise an outline of that width.
    Circle {
        center: Point,
        radius: f64,
        #[serde(default)]
        stroke: Option<f64>,
    },
    /// Top-left anchored plain text.
    Text {
        position: Point,
        text: String,
        #[serde(default = "default_text_size")]
        size: f32,
    },
}

/// Legacy world-space rectangle; `z` is a layer ordinal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlatRect {
    pub rect: Rect,
    pub color: Rgba8Premul,
    #[serde(default)]
    pub z: i32,
}

/// Legacy world-space sprite whose anchor sits on `position`; `z` is a layer ordinal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlatSprite {
    pub position: Point,
    pub sprite: String,
    #[serde(default)]
    pub frame: u32,
    #[serde(default)]
    pub z: i32,
}

impl IsoTile {
    pub fn new(tile: TileCoord) -> Self {
        Self {
            tile,
            ..Self::default()
        }
    }

    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    pub fn with_color(mut self, color: Rgba8Premul) -> Self {
        self.color = Some(color);
        self
    }
}

impl IsoEntity {
    pub fn new(tile: TileCoord) -> Self {
        Self {
            tile,
            ..Self::default()
        }
    }

    pub fn position(&self) -> TilePos {
        TilePos::offset(self.tile, self.offset)
    }
}

impl DrawCommand {
    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IsoTile(_) => "iso_tile",
            Self::IsoEntity(_) => "iso_entity",
            Self::Ui(_) => "ui",
            Self::Primitive(_) => "primitive",
            Self::FlatRect(_) => "flat_rect",
            Self::FlatSprite(_) => "flat_sprite",
            Self::Viewport(_) => "viewport",
            Self::Unknown => "unknown",
        }
    }

    /// Reason this command cannot be drawn, if any.
    pub fn defect(&self) -> Option<&'static str> {
        let pt = |p: Point| p.x.is_finite() && p.y.is_finite();
        let rect = |r: &Rect| pt(r.origin()) && r.x1.is_finite() && r.y1.is_finite();
        match self {
            Self::IsoTile(_) => None,
            Self::IsoEntity(e) => {
                if !e.position().is_finite() || !e.height.is_finite() {
                    Some("non-finite entity position")
                } else {
                    None
                }
            }
            Self::Ui(u) => {
                if !rect(&u.rect) {
                    Some("non-finite ui rect")
                } else if u.rect.abs().area() <= 0.0 {
                    Some("empty ui rect")
                } else {
                    None
                }
            }
            Self::Primitive(p) => match &p.shape {
                PrimitiveShape::Line { from, to, width } => {
                    if !pt(*from) || !pt(*to) || !width.is_finite() || *width <= 0.0 {
                        Some("malformed line")
                    } else {
                        None
                    }
                }
                PrimitiveShape::Circle {
                    center,
                    radius,
                    stroke,
                } => {
                    let stroke_ok = stroke.is_none_or(|w| w.is_finite() && w > 0.0);
                    if !pt(*center) || !radius.is_finite() || *radius <= 0.0 || !stroke_ok {
                        Some("malformed circle")
                    } else {
                        None
                    }
                }
                PrimitiveShape::Text { position, size, .. } => {
                    if !pt(*position) || !size.is_finite() || *size <= 0.0 {
                        Some("malformed text")
                    } else {
                        None
                    }
                }
            },
            Self::FlatRect(r) => {
                if !rect(&r.rect) {
                    Some("non-finite flat rect")
                } else {
                    None
                }
            }
            Self::FlatSprite(s) => {
                if !pt(s.position) {
                    Some("non-finite sprite position")
                } else {
                    None
                }
            }
            Self::Viewport(v) => {
                if !pt(v.position) {
                    Some("non-finite viewport position")
                } else {
                    None
                }
            }
            Self::Unknown => Some("unrecognized command kind"),
        }
    }

    /// Parse a JSON array of commands. Entries that fail to decode become [`DrawCommand::Unknown`]
    /// so one bad entry never drops the rest of the frame.
    pub fn parse_list(json: &str) -> IsoResult<Vec<DrawCommand>> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| IsoError::serde(format!("parse draw command list: {e}")))?;
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                serde_json::from_value(v).unwrap_or_else(|e| {
                    tracing::warn!(index = i, error = %e, "undecodable draw command");
                    DrawCommand::Unknown
                })
            })
            .collect())
    }
}

impl From<IsoTile> for DrawCommand {
    fn from(v: IsoTile) -> Self {
        Self::IsoTile(v)
    }
}

impl From<IsoEntity> for DrawCommand {
    fn from(v: IsoEntity) -> Self {
        Self::IsoEntity(v)
    }
}

impl From<UiElement> for DrawCommand {
    fn from(v: UiElement) -> Self {
        Self::Ui(v)
    }
}

impl From<ScreenPrimitive> for DrawCommand {
    fn from(v: ScreenPrimitive) -> Self {
        Self::Primitive(v)
    }
}

impl From<ViewportConfig> for DrawCommand {
    fn from(v: ViewportConfig) -> Self {
        Self::Viewport(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/command.rs"]
mod tests;
