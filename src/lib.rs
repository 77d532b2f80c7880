//! isoframe is the rendering core of an isometric 2D game.
//!
//! A host submits a flat list of [`DrawCommand`]s each frame. The [`Renderer`] orders them by
//! [`DepthKey`], paints tiles, entities and sprites on the CPU with `vello_cpu`, composites
//! shape-masked [`ViewportConfig`] regions (parallax backgrounds, starfields, velocity warps) into
//! four depth bands, and returns a premultiplied RGBA8 [`FrameRGBA`] together with
//! [`FrameDiagnostics`] describing everything the frame degraded on.
//!
//! - Coordinate transforms: [`IsoProjection`], [`Camera`], [`pick_topmost_tile`]
//! - Dispatch: [`plan_dispatch`], [`sort_commands`]
//! - Masks: [`ViewportShape`], [`generate_mask`], [`MaskCache`]
//! - Viewports: [`ViewportCompositor`], [`ViewportContent`], [`ViewportEffect`]
//! - Animation: [`AnimationTracker`], [`AnimationDef`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod mask;
pub(crate) mod render;
pub(crate) mod transform;
pub(crate) mod viewport;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, PLACEHOLDER_COLOR, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{IsoError, IsoResult};

pub use crate::animation::sheet::{AnimationDef, AnimationSequence};
pub use crate::animation::tracker::{AnimHandle, AnimationState, AnimationTracker, EntityId};
pub use crate::assets::sprite::{NoAssets, SpriteAsset, SpriteResolver, SpriteStore};
pub use crate::mask::cache::{DEFAULT_MASK_CACHE_ENTRIES, MaskCache, MaskCacheStats};
pub use crate::mask::shape::{DEFAULT_DOME_SEGMENTS, Mask, ViewportShape, generate_mask};
pub use crate::render::command::{
    DrawCommand, FlatRect, FlatSprite, IsoEntity, IsoTile, PrimitiveShape, ScreenPrimitive,
    UiElement,
};
pub use crate::render::compositor::ViewportCompositor;
pub use crate::render::depth::{
    DepthKey, ENTITY_BIAS, HEIGHT_BIAS, LAYER_STRIDE, UI_BAND_BASE, WORLD_LAYER_LIMIT,
};
pub use crate::render::diagnostics::{DegradedViewport, FrameDiagnostics, SkippedCommand};
pub use crate::render::dispatch::{DispatchPlan, Route, depth_key, plan_dispatch, route, sort_commands};
pub use crate::render::layers::{DepthBand, DepthLayerSet};
pub use crate::render::renderer::{RenderedFrame, Renderer, RendererOpts};
pub use crate::render::surface::FrameRGBA;
pub use crate::render::surface_pool::{SurfacePoolOpts, SurfacePoolStats};
pub use crate::transform::iso::{
    Camera, HEIGHT_SCALE, IsoProjection, TILE_HEIGHT, TILE_WIDTH, TileCoord, TilePos,
};
pub use crate::transform::pick::{TilePick, pick_topmost_tile};
pub use crate::viewport::config::ViewportConfig;
pub use crate::viewport::content::ViewportContent;
pub use crate::viewport::effects::{MIN_WARP_VELOCITY, ViewportEffect};
