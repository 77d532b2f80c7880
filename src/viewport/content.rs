use crate::foundation::core::{Rgba8Premul, Vec2};
use crate::foundation::math::hash_u32;

fn default_density() -> f64 {
    0.002
}

fn default_parallax() -> f64 {
    0.5
}

fn default_star_layers() -> u32 {
    3
}

/// What a viewport shows before effects run.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportContent {
    /// Vertical gradient from `top` to `bottom`.
    SpaceBackground {
        top: Rgba8Premul,
        bottom: Rgba8Premul,
    },
    /// Procedural stars over deep space. `density` is the per-pixel star probability of each
    /// layer; `parallax` scales how far the nearest layer scrolls with the camera.
    Starfield {
        seed: u64,
        #[serde(default = "default_density")]
        density: f64,
        #[serde(default = "default_parallax")]
        parallax: f64,
        #[serde(default = "default_star_layers")]
        layers: u32,
    },
    Solid(Rgba8Premul),
    /// Leave the buffer transparent.
    #[default]
    None,
}

/// Per-frame inputs shared by every viewport.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ContentContext {
    pub(crate) camera_offset: Vec2,
    /// Mixed into every starfield seed.
    pub(crate) seed_salt: u64,
}

const SPACE: [u8; 4] = [4, 6, 16, 255];
const MAX_STAR_LAYERS: u32 = 8;

/// Render `content` into a cleared `w x h` premultiplied buffer.
///
/// The result is a pure function of the content, the buffer size and `ctx`.
pub(crate) fn render_content(
    content: &ViewportContent,
    buf: &mut [u8],
    w: u32,
    h: u32,
    ctx: ContentContext,
) {
    debug_assert_eq!(buf.len(), (w as usize) * (h as usize) * 4);
    match *content {
        ViewportContent::None => buf.fill(0),
        ViewportContent::Solid(c) => fill(buf, c.to_array()),
        ViewportContent::SpaceBackground { top, bottom } => gradient(buf, w, h, top, bottom),
        ViewportContent::Starfield {
            seed,
            density,
            parallax,
            layers,
        } => starfield(
            buf,
            w,
            h,
            StarParams {
                seed: seed ^ ctx.seed_salt,
                density,
                parallax,
                layers,
            },
            ctx.camera_offset,
        ),
    }
}

fn fill(buf: &mut [u8], rgba: [u8; 4]) {
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn gradient(buf: &mut [u8], w: u32, h: u32, top: Rgba8Premul, bottom: Rgba8Premul) {
    let h1 = (h.max(1) - 1) as f32;
    for y in 0..h {
        let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
        let lerp = |a: u8, b: u8| -> u8 {
            let af = a as f32;
            let bf = b as f32;
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        let c = [
            lerp(top.r, bottom.r),
            lerp(top.g, bottom.g),
            lerp(top.b, bottom.b),
            lerp(top.a, bottom.a),
        ];
        let row = (y as usize) * (w as usize) * 4;
        for px in buf[row..row + (w as usize) * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }
}

struct StarParams {
    seed: u64,
    density: f64,
    parallax: f64,
    layers: u32,
}

fn starfield(buf: &mut [u8], w: u32, h: u32, p: StarParams, camera_offset: Vec2) {
    fill(buf, SPACE);

    let density = if p.density.is_finite() {
        p.density.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if density <= 0.0 {
        return;
    }
    let threshold = (density * f64::from(u32::MAX)) as u32;
    let parallax = if p.parallax.is_finite() { p.parallax } else { 0.0 };
    let layers = p.layers.clamp(1, MAX_STAR_LAYERS);

    for l in 0..layers {
        // Layer `layers - 1` is nearest: brightest and fastest.
        let depth = f64::from(l + 1) / f64::from(layers);
        // Saturates for huge offsets; the lattice wraps rather than overflowing.
        let scroll = |v: f64| -> i64 {
            let s = (v * parallax * depth).floor();
            if s.is_finite() { s as i64 } else { 0 }
        };
        let ox = scroll(camera_offset.x);
        let oy = scroll(camera_offset.y);
        let layer_seed = p.seed ^ u64::from(l + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let peak = 96 + (159 * (l + 1) / layers) as u8;

        for y in 0..h {
            for x in 0..w {
                let gx = i64::from(x).wrapping_add(ox);
                let gy = i64::from(y).wrapping_add(oy);
                if hash_u32(layer_seed, gx, gy) >= threshold {
                    continue;
                }
                let dim = (hash_u32(!layer_seed, gx, gy) & 0x3f) as u8;
                let v = peak.saturating_sub(dim);
                let idx = ((y as usize) * (w as usize) + x as usize) * 4;
                let px = &mut buf[idx..idx + 4];
                px[0] = px[0].max(v);
                px[1] = px[1].max(v);
                px[2] = px[2].max(v.saturating_add(16));
                px[3] = 255;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/content.rs"]
mod tests;
