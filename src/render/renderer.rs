use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;

use crate::animation::tracker::AnimationTracker;
use crate::assets::sprite::SpriteResolver;
use crate::foundation::core::{Canvas, Point, Rect, Vec2};
use crate::foundation::error::{IsoError, IsoResult};
use crate::mask::cache::DEFAULT_MASK_CACHE_ENTRIES;
use crate::render::command::DrawCommand;
use crate::render::composite::{premul_over_in_place_opacity, premul_rgba8};
use crate::render::compositor::ViewportCompositor;
use crate::render::diagnostics::FrameDiagnostics;
use crate::render::dispatch::plan_dispatch;
use crate::render::layers::{DepthBand, DepthLayerSet};
use crate::render::paint::{PaintInputs, Painter};
use crate::render::surface::{FrameRGBA, Surface};
use crate::render::surface_pool::SurfacePoolOpts;
use crate::transform::iso::{Camera, IsoProjection, TileCoord};
use crate::transform::pick::{TilePick, pick_topmost_tile};
use crate::viewport::config::ViewportConfig;

fn default_clear_rgba() -> [u8; 4] {
    [0, 0, 0, 255]
}

fn default_edge_blend_max_px() -> f64 {
    12.0
}

fn default_mask_cache_max_entries() -> usize {
    DEFAULT_MASK_CACHE_ENTRIES
}

/// Renderer configuration. Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    pub projection: IsoProjection,
    /// Straight-alpha RGBA8 the output is cleared to before compositing.
    pub clear_rgba: [u8; 4],
    /// Outline viewport bounds and mark degradations on top of every frame.
    pub debug_overlay: bool,
    /// Feather width in pixels at `edge_blend = 1`.
    pub edge_blend_max_px: f64,
    pub surface_pool: SurfacePoolOpts,
    /// Mixed into every starfield seed.
    pub starfield_seed: u64,
    /// The mask cache empties itself once it holds this many masks.
    pub mask_cache_max_entries: usize,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            projection: IsoProjection::default(),
            clear_rgba: default_clear_rgba(),
            debug_overlay: false,
            edge_blend_max_px: default_edge_blend_max_px(),
            surface_pool: SurfacePoolOpts::default(),
            starfield_seed: 0,
            mask_cache_max_entries: default_mask_cache_max_entries(),
        }
    }
}

impl RendererOpts {
    pub fn with_projection(mut self, projection: IsoProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Return options with a configured clear color for the final output surface.
    pub fn with_clear_rgba(mut self, clear: [u8; 4]) -> Self {
        self.clear_rgba = clear;
        self
    }

    pub fn with_debug_overlay(mut self, on: bool) -> Self {
        self.debug_overlay = on;
        self
    }

    pub fn with_edge_blend_max_px(mut self, px: f64) -> Self {
        self.edge_blend_max_px = px;
        self
    }

    pub fn with_surface_pool(mut self, pool: SurfacePoolOpts) -> Self {
        self.surface_pool = pool;
        self
    }

    pub fn with_starfield_seed(mut self, seed: u64) -> Self {
        self.starfield_seed = seed;
        self
    }

    pub fn with_mask_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.mask_cache_max_entries = max_entries;
        self
    }

    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> IsoResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| IsoError::serde(format!("parse renderer options JSON: {e}")))
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> IsoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open renderer options '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Override fields from `ISOFRAME_DEBUG_OVERLAY` and `ISOFRAME_POOL_MAX_BYTES`.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|k| std::env::var(k).ok())
    }

    /// [`RendererOpts::apply_env`] with an explicit variable lookup.
    pub fn apply_env_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("ISOFRAME_DEBUG_OVERLAY") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.debug_overlay = true,
                "0" | "false" | "off" | "no" | "" => self.debug_overlay = false,
                other => tracing::warn!(value = other, "ignoring ISOFRAME_DEBUG_OVERLAY"),
            }
        }
        if let Some(v) = var("ISOFRAME_POOL_MAX_BYTES") {
            match v.trim().parse::<usize>() {
                Ok(n) => self.surface_pool.max_pool_bytes = n,
                Err(_) => tracing::warn!(value = %v, "ignoring ISOFRAME_POOL_MAX_BYTES"),
            }
        }
        self
    }

    pub fn validate(&self) -> IsoResult<()> {
        let p = &self.projection;
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(p.tile_width) || !ok(p.tile_height) {
            return Err(IsoError::validation(
                "projection tile size must be finite and > 0",
            ));
        }
        if !p.height_scale.is_finite() {
            return Err(IsoError::validation("projection height_scale must be finite"));
        }
        if !self.edge_blend_max_px.is_finite() || self.edge_blend_max_px < 0.0 {
            return Err(IsoError::validation(
                "edge_blend_max_px must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// One rendered frame plus everything it degraded on.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub frame: FrameRGBA,
    pub diagnostics: FrameDiagnostics,
}

/// Single-threaded frame renderer: dispatch, world paint, viewport compositing, band merge,
/// overlay.
///
/// All buffers are owned here and reused across frames; only [`Renderer::new`] and
/// [`Renderer::resize`] allocate at frame size.
pub struct Renderer {
    opts: RendererOpts,
    canvas: Canvas,
    layers: DepthLayerSet,
    output: Surface,
    overlay: Surface,
    compositor: ViewportCompositor,
    painter: Painter,
    animations: AnimationTracker,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("opts", &self.opts)
            .field("canvas", &self.canvas)
            .field("compositor", &self.compositor)
            .field("animations", &self.animations.len())
            .finish()
    }
}

impl Renderer {
    pub fn new(opts: RendererOpts, width: u32, height: u32) -> IsoResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            canvas: Canvas { width, height },
            layers: DepthLayerSet::new(width, height)?,
            output: Surface::new(width, height)?,
            overlay: Surface::new(width, height)?,
            compositor: ViewportCompositor::new(
                opts.surface_pool,
                opts.edge_blend_max_px,
                opts.starfield_seed,
            )
            .with_mask_cache_max_entries(opts.mask_cache_max_entries),
            painter: Painter::new(),
            animations: AnimationTracker::new(),
        })
    }

    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn compositor(&self) -> &ViewportCompositor {
        &self.compositor
    }

    pub fn animations(&self) -> &AnimationTracker {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut AnimationTracker {
        &mut self.animations
    }

    /// Advance every playing animation by `dt` seconds, resolving sequences through `assets`.
    pub fn advance(&mut self, dt: f64, assets: &dyn SpriteResolver) {
        self.animations.update(dt, |sprite, animation| {
            assets
                .sprite(sprite)
                .and_then(|s| s.animations()?.get(animation).copied())
        });
    }

    /// Reallocate every frame-sized buffer. Cached masks and pooled viewport buffers are dropped.
    ///
    /// On error the renderer keeps its previous size.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, width: u32, height: u32) -> IsoResult<()> {
        let output = Surface::new(width, height)?;
        let overlay = Surface::new(width, height)?;
        self.layers.resize(width, height)?;
        self.output = output;
        self.overlay = overlay;
        self.canvas = Canvas { width, height };
        self.compositor.invalidate();
        self.painter.release_context();
        Ok(())
    }

    /// Render one frame.
    ///
    /// Malformed commands, missing sprites and unrenderable viewports degrade and are reported in
    /// [`RenderedFrame::diagnostics`]; they never fail the frame.
    #[tracing::instrument(skip(self, commands, assets), fields(commands = commands.len()))]
    pub fn render_frame(
        &mut self,
        commands: &[DrawCommand],
        camera: &Camera,
        assets: &dyn SpriteResolver,
    ) -> IsoResult<RenderedFrame> {
        let camera = sanitize_camera(camera);
        let plan = plan_dispatch(commands, &self.opts.projection, &camera, self.canvas);
        let mut diag = FrameDiagnostics {
            commands_total: commands.len(),
            skipped: plan.skipped,
            ..FrameDiagnostics::default()
        };

        self.layers.clear();
        let inputs = PaintInputs {
            commands,
            projection: &self.opts.projection,
            camera: &camera,
            screen: self.canvas,
            assets,
        };
        self.painter.paint_world(
            inputs,
            &plan.world,
            &mut self.animations,
            self.layers.band_mut(DepthBand::Scene),
            &mut diag,
        );

        let viewports: Vec<ViewportConfig> = plan
            .viewports
            .iter()
            .filter_map(|&i| match commands.get(i) {
                Some(DrawCommand::Viewport(v)) => Some(v.clone()),
                _ => None,
            })
            .collect();
        diag.commands_drawn += viewports.len();
        self.compositor.set_viewports(viewports);
        self.compositor
            .render_into(&mut self.layers, camera.offset, &mut diag);

        self.output.clear(premul_rgba8(self.opts.clear_rgba));
        self.layers.composite_into(&mut self.output)?;

        if !plan.overlay.is_empty() {
            self.overlay.clear_transparent();
            self.painter
                .paint_overlay(inputs, &plan.overlay, &mut self.overlay, &mut diag);
            premul_over_in_place_opacity(self.output.data_mut(), self.overlay.data(), 1.0)?;
        }

        if self.opts.debug_overlay {
            let outlines: Vec<Rect> = self
                .compositor
                .viewports()
                .iter()
                .map(ViewportConfig::screen_bounds)
                .collect();
            self.overlay.clear_transparent();
            self.painter
                .paint_debug(&outlines, diag.degradation_count(), &mut self.overlay);
            premul_over_in_place_opacity(self.output.data_mut(), self.overlay.data(), 1.0)?;
        }

        Ok(RenderedFrame {
            frame: self.output.to_frame(),
            diagnostics: diag,
        })
    }

    /// Topmost viewport of the last rendered frame under the screen point `p`.
    pub fn hit_test_viewport(&self, p: Point) -> Option<&ViewportConfig> {
        self.compositor.hit_test(p)
    }

    pub fn tile_to_screen(&self, tile: TileCoord, height: i32, camera: &Camera) -> Point {
        self.opts
            .projection
            .tile_to_screen(tile, height, camera, self.canvas)
    }

    pub fn screen_to_tile(&self, p: Point, camera: &Camera) -> TileCoord {
        self.opts.projection.screen_to_tile(p, camera, self.canvas)
    }

    /// Height-aware pick; see [`pick_topmost_tile`].
    pub fn pick_topmost_tile(
        &self,
        p: Point,
        camera: &Camera,
        max_height: i32,
        height_at: impl Fn(TileCoord) -> Option<i32>,
    ) -> TilePick {
        pick_topmost_tile(
            &self.opts.projection,
            p,
            camera,
            self.canvas,
            max_height,
            height_at,
        )
    }
}

/// Replace unusable camera fields so the frame still renders.
fn sanitize_camera(camera: &Camera) -> Camera {
    let offset_ok = camera.offset.x.is_finite() && camera.offset.y.is_finite();
    let zoom_ok = camera.zoom.is_finite() && camera.zoom > 0.0;
    if offset_ok && zoom_ok {
        return *camera;
    }
    tracing::warn!(?camera, "invalid camera; using a neutral fallback");
    Camera {
        offset: if offset_ok { camera.offset } else { Vec2::ZERO },
        zoom: if zoom_ok { camera.zoom } else { 1.0 },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
