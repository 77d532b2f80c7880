use crate::foundation::core::{Point, Vec2};
use crate::foundation::math::{smoothstep, unit_to_u8};
use crate::mask::cache::MaskCache;
use crate::mask::shape::Mask;
use crate::render::composite::{Placement, apply_coverage_in_place, over_at};
use crate::render::diagnostics::FrameDiagnostics;
use crate::render::layers::DepthLayerSet;
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::viewport::config::ViewportConfig;
use crate::viewport::content::{ContentContext, render_content};
use crate::viewport::effects::EffectScratch;

/// Places masked, effected viewport buffers into their depth bands.
///
/// Viewports are kept ordered by layer (submission order breaks ties), which is both the paint
/// order inside a band and, reversed, the hit-test order.
pub struct ViewportCompositor {
    viewports: Vec<ViewportConfig>,
    masks: MaskCache,
    pool: SurfacePool,
    effects: EffectScratch,
    coverage: Vec<u8>,
    distance: Vec<f32>,
    edge_blend_max_px: f64,
    starfield_seed: u64,
}

impl std::fmt::Debug for ViewportCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportCompositor")
            .field("viewports", &self.viewports.len())
            .field("masks", &self.masks.len())
            .finish()
    }
}

impl ViewportCompositor {
    pub fn new(pool: SurfacePoolOpts, edge_blend_max_px: f64, starfield_seed: u64) -> Self {
        Self {
            viewports: Vec::new(),
            masks: MaskCache::new(),
            pool: SurfacePool::new(pool),
            effects: EffectScratch::new(),
            coverage: Vec::new(),
            distance: Vec::new(),
            edge_blend_max_px,
            starfield_seed,
        }
    }

    /// Cap the mask cache at `max_entries` masks, dropping any already cached.
    pub fn with_mask_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.masks = MaskCache::with_max_entries(max_entries);
        self
    }

    /// Replace the active list.
    pub fn set_viewports(&mut self, viewports: Vec<ViewportConfig>) {
        self.viewports = viewports;
        self.viewports
            .sort_by(|a, b| a.order_layer().total_cmp(&b.order_layer()));
    }

    /// Add a viewport after every active viewport on the same or a lower layer.
    pub fn push(&mut self, viewport: ViewportConfig) {
        let layer = viewport.order_layer();
        let at = self
            .viewports
            .partition_point(|v| v.order_layer().total_cmp(&layer).is_le());
        self.viewports.insert(at, viewport);
    }

    pub fn clear_viewports(&mut self) {
        self.viewports.clear();
    }

    /// Active viewports in paint order.
    pub fn viewports(&self) -> &[ViewportConfig] {
        &self.viewports
    }

    pub fn mask_cache(&self) -> &MaskCache {
        &self.masks
    }

    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Drop every cached mask and pooled buffer; called on surface resize.
    pub fn invalidate(&mut self) {
        self.masks.clear();
        self.pool.clear();
    }

    /// Topmost viewport whose shape contains the screen point `p`.
    pub fn hit_test(&self, p: Point) -> Option<&ViewportConfig> {
        self.viewports.iter().rev().find(|v| v.contains_screen(p))
    }

    /// Render every active viewport into its band of `layers`.
    ///
    /// Per viewport: content, effects in order, mask, edge blend, opacity, then source-over at
    /// its position. A viewport that cannot render is reported and skipped.
    #[tracing::instrument(skip_all, fields(viewports = self.viewports.len()))]
    pub fn render_into(
        &mut self,
        layers: &mut DepthLayerSet,
        camera_offset: Vec2,
        diag: &mut FrameDiagnostics,
    ) {
        let before = self.masks.stats();
        let ctx = ContentContext {
            camera_offset,
            seed_salt: self.starfield_seed,
        };

        for v in &self.viewports {
            if v.shape.is_degenerate() {
                diag.degraded_viewport(&v.id, "degenerate shape");
                continue;
            }
            let opacity = if v.opacity.is_finite() {
                v.opacity.clamp(0.0, 1.0)
            } else {
                0.0
            };
            if opacity <= 0.0 {
                continue;
            }

            let bounds = v.shape.bounds();
            let w = bounds.width().ceil() as u32;
            let h = bounds.height().ceil() as u32;
            let mut buf = match self.pool.borrow(w, h) {
                Ok(buf) => buf,
                Err(e) => {
                    diag.degraded_viewport(&v.id, e.to_string());
                    continue;
                }
            };

            render_content(&v.content, buf.data_mut(), w, h, ctx);
            for effect in &v.effects {
                if let Err(e) = self.effects.apply(effect, buf.data_mut(), w, h) {
                    diag.degraded_viewport(&v.id, format!("effect skipped: {e}"));
                }
            }

            let mask = self.masks.get_or_generate(&v.shape, w, h);
            let feather = v.edge_blend.clamp(0.0, 1.0) * self.edge_blend_max_px;
            feather_coverage(&mask, feather as f32, &mut self.distance, &mut self.coverage);
            apply_coverage_in_place(buf.data_mut(), &self.coverage);

            let (lw, lh) = (layers.width(), layers.height());
            over_at(
                layers.band_pixels_mut(v.band()),
                lw,
                lh,
                buf.data(),
                w,
                h,
                Placement {
                    x: v.position.x.round() as i32,
                    y: v.position.y.round() as i32,
                    opacity: opacity as f32,
                },
            );
            self.pool.release(buf);
        }

        let after = self.masks.stats();
        diag.mask_cache_hits += after.hits - before.hits;
        diag.mask_cache_misses += after.misses - before.misses;
    }
}

/// Turn a binary mask into per-pixel coverage, fading to zero over `feather_px` pixels inside
/// the mask edge. The buffer border counts as an edge.
pub(crate) fn feather_coverage(
    mask: &Mask,
    feather_px: f32,
    distance: &mut Vec<f32>,
    out: &mut Vec<u8>,
) {
    out.clear();
    if !feather_px.is_finite() || feather_px <= 0.0 {
        out.extend_from_slice(&mask.data);
        return;
    }

    let w = mask.width as usize;
    let h = mask.height as usize;
    chamfer_distance(mask, distance);

    out.extend(mask.data.iter().zip(distance.iter()).map(|(&m, &d)| {
        if m == 0 {
            0
        } else {
            unit_to_u8(smoothstep(0.0, feather_px, d))
        }
    }));
    debug_assert_eq!(out.len(), w * h);
}

/// Two-pass 3x3 chamfer distance from each covered pixel to the nearest uncovered one.
fn chamfer_distance(mask: &Mask, d: &mut Vec<f32>) {
    const DIAG: f32 = std::f32::consts::SQRT_2;
    let w = mask.width as usize;
    let h = mask.height as usize;
    d.clear();
    d.extend(
        mask.data
            .iter()
            .map(|&m| if m == 0 { 0.0 } else { f32::INFINITY }),
    );

    // Outside the buffer counts as uncovered.
    let at = |d: &[f32], x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            d[y as usize * w + x as usize]
        }
    };

    for y in 0..h as isize {
        for x in 0..w as isize {
            let i = y as usize * w + x as usize;
            if d[i] == 0.0 {
                continue;
            }
            let v = d[i]
                .min(at(d, x - 1, y) + 1.0)
                .min(at(d, x, y - 1) + 1.0)
                .min(at(d, x - 1, y - 1) + DIAG)
                .min(at(d, x + 1, y - 1) + DIAG);
            d[i] = v;
        }
    }
    for y in (0..h as isize).rev() {
        for x in (0..w as isize).rev() {
            let i = y as usize * w + x as usize;
            if d[i] == 0.0 {
                continue;
            }
            let v = d[i]
                .min(at(d, x + 1, y) + 1.0)
                .min(at(d, x, y + 1) + 1.0)
                .min(at(d, x + 1, y + 1) + DIAG)
                .min(at(d, x - 1, y + 1) + DIAG);
            d[i] = v;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
