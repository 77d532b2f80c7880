use std::collections::BTreeMap;
use std::sync::Arc;

use crate::animation::sheet::AnimationDef;
use crate::assets::decode::{decode_image, premultiply_rgba8_in_place};
use crate::foundation::core::Point;
use crate::foundation::error::{IsoError, IsoResult};

/// A sprite sheet: one premultiplied RGBA8 image cut into a row-major grid of equal frames.
///
/// The anchor is the pixel (within a frame) that sits on the projected tile centre. It defaults
/// to the centre of the bottom tile diamond of a frame, `(frame_width / 2, frame_height -
/// frame_width / 4)`, which is the diamond centre for a plain 2:1 tile image.
#[derive(Clone, Debug)]
pub struct SpriteAsset {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    frame_width: u32,
    frame_height: u32,
    anchor: Point,
    animations: Option<AnimationDef>,
}

impl SpriteAsset {
    /// Wrap premultiplied RGBA8 pixels as a single-frame sprite.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> IsoResult<Self> {
        if width == 0 || height == 0 {
            return Err(IsoError::asset("sprite dimensions must be non-zero"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if data.len() != expected {
            return Err(IsoError::asset(format!(
                "sprite byte len mismatch: expected {expected}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
            frame_width: width,
            frame_height: height,
            anchor: default_anchor(width, height),
            animations: None,
        })
    }

    /// Same as [`SpriteAsset::from_premul_rgba8`] for straight-alpha input.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> IsoResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_rgba8(width, height, data)
    }

    /// Decode an encoded image (PNG, JPEG, ...) into a single-frame sprite.
    pub fn decode(bytes: &[u8]) -> IsoResult<Self> {
        let img = decode_image(bytes)?;
        Ok(Self {
            width: img.width,
            height: img.height,
            rgba8_premul: img.rgba8_premul,
            frame_width: img.width,
            frame_height: img.height,
            anchor: default_anchor(img.width, img.height),
            animations: None,
        })
    }

    /// Cut the sheet into `frame_width x frame_height` frames. Resets the anchor to the default
    /// for the new frame size.
    pub fn with_frame_grid(mut self, frame_width: u32, frame_height: u32) -> IsoResult<Self> {
        if frame_width == 0 || frame_height == 0 {
            return Err(IsoError::asset("frame size must be non-zero"));
        }
        if !self.width.is_multiple_of(frame_width) || !self.height.is_multiple_of(frame_height) {
            return Err(IsoError::asset(format!(
                "frame grid {frame_width}x{frame_height} does not divide sheet {}x{}",
                self.width, self.height
            )));
        }
        self.frame_width = frame_width;
        self.frame_height = frame_height;
        self.anchor = default_anchor(frame_width, frame_height);
        Ok(self)
    }

    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_animations(mut self, animations: AnimationDef) -> Self {
        self.animations = Some(animations);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn columns(&self) -> u32 {
        self.width / self.frame_width
    }

    pub fn frame_count(&self) -> u32 {
        self.columns() * (self.height / self.frame_height)
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn animations(&self) -> Option<&AnimationDef> {
        self.animations.as_ref()
    }

    /// Frame index actually drawn for a requested sheet frame (wraps past the last frame).
    pub(crate) fn resolve_frame(&self, frame: u32) -> u32 {
        frame % self.frame_count().max(1)
    }

    /// Copy one frame out of the sheet as tightly packed premultiplied RGBA8.
    pub(crate) fn frame_pixels(&self, frame: u32) -> Vec<u8> {
        let frame = self.resolve_frame(frame);
        let cols = self.columns().max(1);
        let fx = (frame % cols) * self.frame_width;
        let fy = (frame / cols) * self.frame_height;

        let row_len = self.frame_width as usize * 4;
        let mut out = Vec::with_capacity(row_len * self.frame_height as usize);
        for row in 0..self.frame_height {
            let start = (((fy + row) as usize) * (self.width as usize) + fx as usize) * 4;
            out.extend_from_slice(&self.rgba8_premul[start..start + row_len]);
        }
        out
    }
}

fn default_anchor(frame_width: u32, frame_height: u32) -> Point {
    let w = f64::from(frame_width);
    let h = f64::from(frame_height);
    Point::new(w / 2.0, (h - w / 4.0).max(0.0))
}

/// Host-side asset lookup. Unresolved ids never fail a frame; they paint a placeholder.
pub trait SpriteResolver {
    fn sprite(&self, id: &str) -> Option<Arc<SpriteAsset>>;

    /// Font bytes (TTF/OTF) for the text primitive.
    fn font(&self) -> Option<Arc<Vec<u8>>> {
        None
    }
}

/// Resolver with no sprites and no font.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl SpriteResolver for NoAssets {
    fn sprite(&self, _id: &str) -> Option<Arc<SpriteAsset>> {
        None
    }
}

/// In-memory resolver keyed by sprite id.
#[derive(Clone, Debug, Default)]
pub struct SpriteStore {
    sprites: BTreeMap<String, Arc<SpriteAsset>>,
    font: Option<Arc<Vec<u8>>>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, asset: SpriteAsset) {
        self.sprites.insert(id.into(), Arc::new(asset));
    }

    /// Decode and insert a single-frame sprite.
    pub fn insert_encoded(&mut self, id: impl Into<String>, bytes: &[u8]) -> IsoResult<()> {
        let asset = SpriteAsset::decode(bytes)?;
        self.insert(id, asset);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<SpriteAsset>> {
        self.sprites.remove(id)
    }

    pub fn set_font(&mut self, bytes: Vec<u8>) {
        self.font = Some(Arc::new(bytes));
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteResolver for SpriteStore {
    fn sprite(&self, id: &str) -> Option<Arc<SpriteAsset>> {
        self.sprites.get(id).cloned()
    }

    fn font(&self) -> Option<Arc<Vec<u8>>> {
        self.font.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sprite.rs"]
mod tests;
