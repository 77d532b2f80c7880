//! Tile / world / screen conversions for the isometric projection.
//!
//! World space is the linear isometric map of tile space plus a height shear; screen space is
//! world space after the camera's offset and zoom, centred on the output surface. For
//! `zoom > 0` every mapping here has an exact algebraic inverse (height excluded, which a 2D
//! point cannot carry). Non-positive zoom is a caller precondition and is not checked.

use crate::foundation::core::{Affine, Canvas, Point, Vec2};

/// Default diamond width in world units.
pub const TILE_WIDTH: f64 = 64.0;
/// Default diamond height in world units.
pub const TILE_HEIGHT: f64 = 32.0;
/// World-space lift per height level.
pub const HEIGHT_SCALE: f64 = 16.0;

/// Integer address of a map cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Continuous tile-space position, used for smooth sub-tile motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TilePos {
    pub x: f64,
    pub y: f64,
}

impl TilePos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `tile + offset`, where `offset` is measured in tiles.
    pub fn offset(tile: TileCoord, offset: Vec2) -> Self {
        Self {
            x: f64::from(tile.x) + offset.x,
            y: f64::from(tile.y) + offset.y,
        }
    }

    /// Nearest tile; a tile's diamond covers `[t - 0.5, t + 0.5)` on both axes.
    pub fn round(self) -> TileCoord {
        TileCoord {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<TileCoord> for TilePos {
    fn from(t: TileCoord) -> Self {
        Self {
            x: f64::from(t.x),
            y: f64::from(t.y),
        }
    }
}

/// Host-owned view state. Read-only to the renderer during a frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Camera {
    /// World point shown at the centre of the screen.
    pub offset: Vec2,
    /// Uniform scale; must be `> 0`.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new(offset: Vec2, zoom: f64) -> Self {
        Self { offset, zoom }
    }

    /// `screen = (world - offset) * zoom + screen_center`.
    pub fn world_to_screen(&self, world: Point, screen: Canvas) -> Point {
        let c = screen.center();
        Point::new(
            (world.x - self.offset.x) * self.zoom + c.x,
            (world.y - self.offset.y) * self.zoom + c.y,
        )
    }

    pub fn screen_to_world(&self, p: Point, screen: Canvas) -> Point {
        let c = screen.center();
        Point::new(
            (p.x - c.x) / self.zoom + self.offset.x,
            (p.y - c.y) / self.zoom + self.offset.y,
        )
    }

    /// The same mapping as [`Camera::world_to_screen`], as an affine for rasterization.
    pub fn world_to_screen_affine(&self, screen: Canvas) -> Affine {
        Affine::translate(screen.center())
            * Affine::scale(self.zoom)
            * Affine::translate(-self.offset)
    }
}

/// Projection metrics. The defaults match [`TILE_WIDTH`], [`TILE_HEIGHT`] and [`HEIGHT_SCALE`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IsoProjection {
    pub tile_width: f64,
    pub tile_height: f64,
    pub height_scale: f64,
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self {
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            height_scale: HEIGHT_SCALE,
        }
    }
}

impl IsoProjection {
    pub fn half_width(&self) -> f64 {
        self.tile_width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.tile_height / 2.0
    }

    /// Centre of the tile's diamond in world space.
    pub fn tile_to_world(&self, tile: TileCoord, height: i32) -> Point {
        self.tile_pos_to_world(tile.into(), f64::from(height))
    }

    pub fn tile_pos_to_world(&self, pos: TilePos, height: f64) -> Point {
        Point::new(
            (pos.x - pos.y) * self.half_width(),
            (pos.x + pos.y) * self.half_height() - height * self.height_scale,
        )
    }

    /// Exact inverse of the linear part of [`IsoProjection::tile_pos_to_world`] at height 0.
    pub fn world_to_tile_f(&self, world: Point) -> TilePos {
        let a = world.x / self.half_width();
        let b = world.y / self.half_height();
        TilePos {
            x: (b + a) / 2.0,
            y: (b - a) / 2.0,
        }
    }

    pub fn world_to_tile(&self, world: Point) -> TileCoord {
        self.world_to_tile_f(world).round()
    }

    /// Inverse for a point known to lie on the plane at `height`.
    pub fn world_to_tile_at_height(&self, world: Point, height: i32) -> TilePos {
        let lifted = Point::new(world.x, world.y + f64::from(height) * self.height_scale);
        self.world_to_tile_f(lifted)
    }

    /// Diamond vertices in world space: top, right, bottom, left.
    pub fn tile_diamond(&self, tile: TileCoord, height: i32) -> [Point; 4] {
        let c = self.tile_to_world(tile, height);
        let (hw, hh) = (self.half_width(), self.half_height());
        [
            Point::new(c.x, c.y - hh),
            Point::new(c.x + hw, c.y),
            Point::new(c.x, c.y + hh),
            Point::new(c.x - hw, c.y),
        ]
    }

    pub fn tile_to_screen(
        &self,
        tile: TileCoord,
        height: i32,
        camera: &Camera,
        screen: Canvas,
    ) -> Point {
        camera.world_to_screen(self.tile_to_world(tile, height), screen)
    }

    /// Offset-aware variant of [`IsoProjection::tile_to_screen`] for sub-tile positions.
    pub fn tile_pos_to_screen(
        &self,
        pos: TilePos,
        height: f64,
        camera: &Camera,
        screen: Canvas,
    ) -> Point {
        camera.world_to_screen(self.tile_pos_to_world(pos, height), screen)
    }

    pub fn screen_to_tile_f(&self, p: Point, camera: &Camera, screen: Canvas) -> TilePos {
        self.world_to_tile_f(camera.screen_to_world(p, screen))
    }

    /// Tile under a screen point, assuming the ground plane (height 0).
    pub fn screen_to_tile(&self, p: Point, camera: &Camera, screen: Canvas) -> TileCoord {
        self.screen_to_tile_f(p, camera, screen).round()
    }

    /// Tile under a screen point on the plane at an externally supplied height.
    pub fn screen_to_tile_at_height(
        &self,
        p: Point,
        camera: &Camera,
        screen: Canvas,
        height: i32,
    ) -> TileCoord {
        self.world_to_tile_at_height(camera.screen_to_world(p, screen), height)
            .round()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/iso.rs"]
mod tests;
