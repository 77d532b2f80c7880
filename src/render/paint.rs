use std::collections::HashMap;
use std::sync::Arc;

use vello_cpu::kurbo::Shape as _;

use crate::animation::tracker::{AnimationTracker, EntityId};
use crate::assets::sprite::{SpriteAsset, SpriteResolver};
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Canvas, PLACEHOLDER_COLOR, Point, Rect, Rgba8Premul};
use crate::render::command::{
    DrawCommand, FlatRect, FlatSprite, IsoEntity, IsoTile, PrimitiveShape, ScreenPrimitive,
    UiElement,
};
use crate::render::diagnostics::FrameDiagnostics;
use crate::render::surface::{Surface, rgba_premul_to_image};
use crate::transform::iso::{Camera, IsoProjection};

const DEFAULT_TILE_COLOR: Rgba8Premul = Rgba8Premul {
    r: 92,
    g: 112,
    b: 84,
    a: 255,
};
const DEFAULT_ENTITY_COLOR: Rgba8Premul = Rgba8Premul {
    r: 220,
    g: 200,
    b: 120,
    a: 255,
};
const DEBUG_OUTLINE: [u8; 4] = [255, 220, 0, 255];
const DEBUG_MARKER: [u8; 4] = [255, 40, 40, 255];
const MAX_DEBUG_MARKERS: usize = 32;
const CURVE_TOLERANCE: f64 = 0.1;

/// Per-frame read-only inputs shared by every paint call.
#[derive(Clone, Copy)]
pub(crate) struct PaintInputs<'a> {
    pub(crate) commands: &'a [DrawCommand],
    pub(crate) projection: &'a IsoProjection,
    pub(crate) camera: &'a Camera,
    pub(crate) screen: Canvas,
    pub(crate) assets: &'a dyn SpriteResolver,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FrameKey {
    sprite: String,
    frame: u32,
}

#[derive(Clone)]
struct CachedFrame {
    source: Arc<SpriteAsset>,
    image: vello_cpu::Image,
}

#[derive(Clone)]
struct CachedFont {
    bytes: Arc<Vec<u8>>,
    font: vello_cpu::peniko::FontData,
}

/// A resolved sprite frame ready to paint.
struct FramePaint {
    image: vello_cpu::Image,
    size: (f64, f64),
    anchor: Point,
}

/// Rasterizes draw commands with `vello_cpu`, caching sliced sprite frames and the text font.
pub(crate) struct Painter {
    ctx: Option<vello_cpu::RenderContext>,
    frames: HashMap<FrameKey, CachedFrame>,
    text_engine: TextLayoutEngine,
    font: Option<CachedFont>,
}

impl Default for Painter {
    fn default() -> Self {
        Self::new()
    }
}

impl Painter {
    pub(crate) fn new() -> Self {
        Self {
            ctx: None,
            frames: HashMap::new(),
            text_engine: TextLayoutEngine::new(),
            font: None,
        }
    }

    /// Drop the render context so the next frame allocates one at the new size.
    pub(crate) fn release_context(&mut self) {
        self.ctx = None;
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    /// Paint world-routed commands (`order` is already depth-sorted) into `dst`.
    ///
    /// Entities that reference an animation get tracker state on first sight.
    pub(crate) fn paint_world(
        &mut self,
        inputs: PaintInputs<'_>,
        order: &[usize],
        animations: &mut AnimationTracker,
        dst: &mut Surface,
        diag: &mut FrameDiagnostics,
    ) {
        let (w, h) = dst.dims_u16();
        let world = affine_to_cpu(inputs.camera.world_to_screen_affine(inputs.screen));
        self.with_ctx_mut(w, h, |this, ctx| {
            for &i in order {
                let Some(cmd) = inputs.commands.get(i) else {
                    continue;
                };
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                match cmd {
                    DrawCommand::IsoTile(t) => this.draw_tile(ctx, world, inputs, t, diag),
                    DrawCommand::IsoEntity(e) => {
                        this.draw_entity(ctx, world, inputs, e, animations, diag)
                    }
                    DrawCommand::FlatRect(r) => draw_flat_rect(ctx, world, r),
                    DrawCommand::FlatSprite(s) => this.draw_flat_sprite(ctx, world, inputs, s, diag),
                    _ => continue,
                }
                diag.commands_drawn += 1;
            }
            ctx.flush();
            ctx.render_to_pixmap(dst.pixmap_mut());
        });
    }

    /// Paint UI elements and screen primitives into a transparent `dst`.
    pub(crate) fn paint_overlay(
        &mut self,
        inputs: PaintInputs<'_>,
        order: &[usize],
        dst: &mut Surface,
        diag: &mut FrameDiagnostics,
    ) {
        let (w, h) = dst.dims_u16();
        self.with_ctx_mut(w, h, |this, ctx| {
            for &i in order {
                let Some(cmd) = inputs.commands.get(i) else {
                    continue;
                };
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                match cmd {
                    DrawCommand::Ui(u) => this.draw_ui(ctx, inputs, u, diag),
                    DrawCommand::Primitive(p) => this.draw_primitive(ctx, inputs, p, diag),
                    _ => continue,
                }
                diag.commands_drawn += 1;
            }
            ctx.flush();
            ctx.render_to_pixmap(dst.pixmap_mut());
        });
    }

    /// Outline `outlines` and draw one marker square per degradation into a transparent `dst`.
    pub(crate) fn paint_debug(&mut self, outlines: &[Rect], markers: usize, dst: &mut Surface) {
        let (w, h) = dst.dims_u16();
        self.with_ctx_mut(w, h, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            set_color(ctx, DEBUG_OUTLINE);
            for r in outlines {
                let (x0, y0, x1, y1) = (r.x0, r.y0, r.x1, r.y1);
                for edge in [
                    (x0, y0, x1, y0 + 1.0),
                    (x0, y1 - 1.0, x1, y1),
                    (x0, y0, x0 + 1.0, y1),
                    (x1 - 1.0, y0, x1, y1),
                ] {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(edge.0, edge.1, edge.2, edge.3));
                }
            }
            set_color(ctx, DEBUG_MARKER);
            for i in 0..markers.min(MAX_DEBUG_MARKERS) {
                let x = 2.0 + 8.0 * i as f64;
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, 2.0, x + 6.0, 8.0));
            }
            ctx.flush();
            ctx.render_to_pixmap(dst.pixmap_mut());
        });
    }

    fn frame(
        &mut self,
        assets: &dyn SpriteResolver,
        id: &str,
        frame: u32,
        diag: &mut FrameDiagnostics,
    ) -> Option<FramePaint> {
        let Some(asset) = assets.sprite(id) else {
            diag.missing_sprite(id);
            return None;
        };
        let frame = asset.resolve_frame(frame);
        let (fw, fh) = asset.frame_size();
        let paint = |image: vello_cpu::Image| FramePaint {
            image,
            size: (f64::from(fw), f64::from(fh)),
            anchor: asset.anchor(),
        };

        let key = FrameKey {
            sprite: id.to_owned(),
            frame,
        };
        if let Some(c) = self.frames.get(&key)
            && Arc::ptr_eq(&c.source, &asset)
        {
            return Some(paint(c.image.clone()));
        }

        match rgba_premul_to_image(&asset.frame_pixels(frame), fw, fh) {
            Ok(image) => {
                self.frames.insert(
                    key,
                    CachedFrame {
                        source: Arc::clone(&asset),
                        image: image.clone(),
                    },
                );
                Some(paint(image))
            }
            Err(e) => {
                tracing::warn!(sprite = id, frame, error = %e, "sprite frame not paintable");
                diag.missing_sprite(id);
                None
            }
        }
    }

    fn draw_tile(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        world: vello_cpu::kurbo::Affine,
        inputs: PaintInputs<'_>,
        t: &IsoTile,
        diag: &mut FrameDiagnostics,
    ) {
        let color = match &t.sprite {
            Some(id) => match self.frame(inputs.assets, id, t.frame, diag) {
                Some(f) => {
                    let at = inputs.projection.tile_to_world(t.tile, t.height);
                    draw_frame(ctx, world, at, &f);
                    return;
                }
                None => PLACEHOLDER_COLOR,
            },
            None => t.color.unwrap_or(DEFAULT_TILE_COLOR),
        };
        ctx.set_transform(world);
        set_color(ctx, color.to_straight());
        ctx.fill_path(&polygon(&inputs.projection.tile_diamond(t.tile, t.height)));
    }

    fn draw_entity(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        world: vello_cpu::kurbo::Affine,
        inputs: PaintInputs<'_>,
        e: &IsoEntity,
        animations: &mut AnimationTracker,
        diag: &mut FrameDiagnostics,
    ) {
        let at = inputs
            .projection
            .tile_pos_to_world(e.position(), e.height);
        let color = match &e.sprite {
            Some(id) => {
                let frame = entity_frame(inputs.assets, e, id, animations);
                match self.frame(inputs.assets, id, frame, diag) {
                    Some(f) => {
                        draw_frame(ctx, world, at, &f);
                        return;
                    }
                    None => PLACEHOLDER_COLOR,
                }
            }
            None => e.color.unwrap_or(DEFAULT_ENTITY_COLOR),
        };
        // Upright block standing on the entity's ground point.
        let hw = inputs.projection.half_width() / 2.0;
        let body_h = inputs.projection.tile_height;
        ctx.set_transform(world);
        set_color(ctx, color.to_straight());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            at.x - hw / 2.0,
            at.y - body_h,
            at.x + hw / 2.0,
            at.y,
        ));
    }

    fn draw_flat_sprite(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        world: vello_cpu::kurbo::Affine,
        inputs: PaintInputs<'_>,
        s: &FlatSprite,
        diag: &mut FrameDiagnostics,
    ) {
        if let Some(f) = self.frame(inputs.assets, &s.sprite, s.frame, diag) {
            draw_frame(ctx, world, s.position, &f);
            return;
        }
        let half = inputs.projection.half_height();
        ctx.set_transform(world);
        set_color(ctx, PLACEHOLDER_COLOR.to_straight());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            s.position.x - half,
            s.position.y - half,
            s.position.x + half,
            s.position.y + half,
        ));
    }

    fn draw_ui(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        inputs: PaintInputs<'_>,
        u: &UiElement,
        diag: &mut FrameDiagnostics,
    ) {
        let sw = f64::from(inputs.screen.width);
        let sh = f64::from(inputs.screen.height);
        let r = u.rect.abs();
        let px = Rect::new(r.x0 * sw, r.y0 * sh, r.x1 * sw, r.y1 * sh);

        if let Some(id) = &u.sprite {
            if let Some(f) = self.frame(inputs.assets, id, 0, diag) {
                let (fw, fh) = f.size;
                let fit = Affine::translate(px.origin().to_vec2())
                    * Affine::scale_non_uniform(px.width() / fw, px.height() / fh);
                ctx.set_transform(affine_to_cpu(fit));
                ctx.set_paint(f.image);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, fw, fh));
                return;
            }
            set_color(ctx, PLACEHOLDER_COLOR.to_straight());
        } else if let Some(c) = u.color {
            set_color(ctx, c.to_straight());
        } else {
            return;
        }
        ctx.fill_rect(&cpu_rect(px));
    }

    fn draw_primitive(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        inputs: PaintInputs<'_>,
        p: &ScreenPrimitive,
        diag: &mut FrameDiagnostics,
    ) {
        let rgba = p.color.to_straight();
        match &p.shape {
            PrimitiveShape::Line { from, to, width } => {
                let Some(path) = line_path(*from, *to) else {
                    return;
                };
                set_color(ctx, rgba);
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(*width)
                        .with_caps(vello_cpu::kurbo::Cap::Round)
                        .with_join(vello_cpu::kurbo::Join::Round),
                );
                ctx.stroke_path(&path);
            }
            PrimitiveShape::Circle {
                center,
                radius,
                stroke,
            } => {
                set_color(ctx, rgba);
                let path = circle_path(*center, *radius);
                match stroke {
                    None => ctx.fill_path(&path),
                    Some(w) => {
                        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*w));
                        ctx.stroke_path(&path);
                    }
                }
            }
            PrimitiveShape::Text {
                position,
                text,
                size,
            } => self.draw_text(ctx, inputs, *position, text, *size, rgba, diag),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        inputs: PaintInputs<'_>,
        position: Point,
        text: &str,
        size: f32,
        rgba: [u8; 4],
        diag: &mut FrameDiagnostics,
    ) {
        let brush = TextBrushRgba8 {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
        };
        let shaped = match inputs.assets.font() {
            Some(bytes) => {
                let font = self.font_for(bytes);
                self.text_engine
                    .layout_plain(text, &font.bytes, size, brush)
                    .map(|layout| (layout, font.font))
                    .map_err(|e| e.to_string())
            }
            None => Err("no font available".to_owned()),
        };

        match shaped {
            Ok((layout, font)) => {
                ctx.set_transform(affine_to_cpu(Affine::translate(position.to_vec2())));
                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let b = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "text drawn as placeholder bar");
                diag.text_fallbacks += 1;
                let s = f64::from(size);
                let chars = text.chars().count() as f64;
                set_color(ctx, rgba);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    position.x,
                    position.y + s * 0.2,
                    position.x + chars * s * 0.6,
                    position.y + s * 0.9,
                ));
            }
        }
    }

    fn font_for(&mut self, bytes: Arc<Vec<u8>>) -> CachedFont {
        if let Some(f) = &self.font
            && Arc::ptr_eq(&f.bytes, &bytes)
        {
            return f.clone();
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        let cached = CachedFont { bytes, font };
        self.font = Some(cached.clone());
        cached
    }
}

/// Sheet frame for an entity: its animation when tracked and known, otherwise its fixed frame.
fn entity_frame(
    assets: &dyn SpriteResolver,
    e: &IsoEntity,
    sprite: &str,
    animations: &mut AnimationTracker,
) -> u32 {
    let (Some(entity), Some(name)) = (e.entity, e.animation.as_deref()) else {
        return e.frame;
    };
    let entity = EntityId(entity);
    animations.ensure(entity, sprite, name);
    let Some(asset) = assets.sprite(sprite) else {
        return 0;
    };
    asset
        .animations()
        .and_then(|defs| defs.get(name))
        .and_then(|seq| animations.sheet_frame(entity, seq))
        .unwrap_or(0)
}

fn draw_flat_rect(ctx: &mut vello_cpu::RenderContext, world: vello_cpu::kurbo::Affine, r: &FlatRect) {
    ctx.set_transform(world);
    set_color(ctx, r.color.to_straight());
    ctx.fill_rect(&cpu_rect(r.rect.abs()));
}

fn draw_frame(
    ctx: &mut vello_cpu::RenderContext,
    world: vello_cpu::kurbo::Affine,
    at: Point,
    f: &FramePaint,
) {
    let origin = at - f.anchor.to_vec2();
    ctx.set_transform(world * vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
    ctx.set_paint(f.image.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f.size.0, f.size.1));
}

fn set_color(ctx: &mut vello_cpu::RenderContext, rgba: [u8; 4]) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn cpu_rect(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn polygon(points: &[Point]) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    for (i, pt) in points.iter().enumerate() {
        if i == 0 {
            p.move_to((pt.x, pt.y));
        } else {
            p.line_to((pt.x, pt.y));
        }
    }
    p.close_path();
    p
}

/// Segment path for stroking; `None` for zero-length lines.
fn line_path(from: Point, to: Point) -> Option<vello_cpu::kurbo::BezPath> {
    if (to - from).hypot() <= f64::EPSILON {
        return None;
    }
    let line = vello_cpu::kurbo::Line::new((from.x, from.y), (to.x, to.y));
    Some(line.to_path(CURVE_TOLERANCE))
}

fn circle_path(center: Point, radius: f64) -> vello_cpu::kurbo::BezPath {
    vello_cpu::kurbo::Circle::new((center.x, center.y), radius).to_path(CURVE_TOLERANCE)
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
