//! Multi-level tile selection.
//!
//! A screen point cannot carry height, so picking over stacked terrain needs a rule. We use
//! "topmost occupied tile in column": scan candidate heights from the top down and accept the
//! first candidate tile whose occupied height matches the scanned plane.

use crate::foundation::core::{Canvas, Point};
use crate::transform::iso::{Camera, IsoProjection, TileCoord};

/// Result of a height-aware pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TilePick {
    pub tile: TileCoord,
    pub height: i32,
}

/// Pick the topmost occupied tile under `p`.
///
/// `height_at` reports the top occupied height of a tile column, or `None` when the column is
/// empty. Falls back to the ground-plane tile at height 0 when no column matches.
pub fn pick_topmost_tile(
    projection: &IsoProjection,
    p: Point,
    camera: &Camera,
    screen: Canvas,
    max_height: i32,
    height_at: impl Fn(TileCoord) -> Option<i32>,
) -> TilePick {
    for h in (0..=max_height.max(0)).rev() {
        let tile = projection.screen_to_tile_at_height(p, camera, screen, h);
        if height_at(tile) == Some(h) {
            return TilePick { tile, height: h };
        }
    }
    TilePick {
        tile: projection.screen_to_tile(p, camera, screen),
        height: 0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/pick.rs"]
mod tests;
