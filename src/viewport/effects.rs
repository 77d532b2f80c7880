use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Rgba8Premul, Vec2};
use crate::foundation::error::{IsoError, IsoResult};
use crate::render::composite::color_matrix_in_place;

/// Below this speed (pixels per frame) a velocity warp leaves the buffer untouched.
pub const MIN_WARP_VELOCITY: f64 = 0.5;

const MAX_STREAK_PX: f64 = 48.0;
const MAX_STREAK_SAMPLES: usize = 32;
const MAX_BLUR_RADIUS: u32 = 128;

fn default_strength() -> f64 {
    1.0
}

/// Post-processing stage applied in place to a viewport buffer. A list of effects runs in
/// order; reordering a list changes the output.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportEffect {
    /// Directional streak trailing behind `velocity`.
    VelocityWarp {
        velocity: Vec2,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    /// Mix straight color toward `color` by `amount` in `[0, 1]`; alpha is kept.
    Tint { color: Rgba8Premul, amount: f64 },
    /// Separable Gaussian blur.
    Blur { radius_px: u32, sigma: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BlurKernelKey {
    radius_px: u32,
    sigma_bits: u32,
}

/// Scratch buffers and kernel cache reused across effect passes.
#[derive(Debug, Default)]
pub(crate) struct EffectScratch {
    a: Vec<u8>,
    b: Vec<u8>,
    blur_kernels: HashMap<BlurKernelKey, Arc<Vec<u32>>>,
}

impl EffectScratch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Apply one effect to a `w x h` premultiplied buffer.
    pub(crate) fn apply(
        &mut self,
        effect: &ViewportEffect,
        buf: &mut [u8],
        w: u32,
        h: u32,
    ) -> IsoResult<()> {
        debug_assert_eq!(buf.len(), (w as usize) * (h as usize) * 4);
        match *effect {
            ViewportEffect::VelocityWarp { velocity, strength } => {
                self.velocity_warp(buf, w, h, velocity, strength);
                Ok(())
            }
            ViewportEffect::Tint { color, amount } => {
                tint(buf, color, amount);
                Ok(())
            }
            ViewportEffect::Blur { radius_px, sigma } => self.blur(buf, w, h, radius_px, sigma),
        }
    }

    fn velocity_warp(&mut self, buf: &mut [u8], w: u32, h: u32, velocity: Vec2, strength: f64) {
        let speed = velocity.hypot();
        if !speed.is_finite() || speed < MIN_WARP_VELOCITY {
            return;
        }
        if !strength.is_finite() || strength <= 0.0 {
            return;
        }
        let len = (speed * strength).min(MAX_STREAK_PX);
        if len < 1.0 {
            return;
        }

        let samples = (len.ceil() as usize + 1).clamp(2, MAX_STREAK_SAMPLES);
        let step = len / (samples - 1) as f64;
        // Streak trails opposite to the motion.
        let dir = -velocity / speed;

        self.a.clear();
        self.a.extend_from_slice(buf);
        let src = &self.a;

        let (wi, hi) = (i64::from(w), i64::from(h));
        let offsets: Vec<(i64, i64)> = (0..samples)
            .map(|k| {
                let d = dir * (k as f64 * step);
                (d.x.round() as i64, d.y.round() as i64)
            })
            .collect();

        for y in 0..hi {
            for x in 0..wi {
                let mut acc = [0u32; 4];
                for &(dx, dy) in &offsets {
                    let sx = (x + dx).clamp(0, wi - 1);
                    let sy = (y + dy).clamp(0, hi - 1);
                    let idx = ((sy * wi + sx) as usize) * 4;
                    for c in 0..4 {
                        acc[c] += u32::from(src[idx + c]);
                    }
                }
                let out = ((y * wi + x) as usize) * 4;
                let n = offsets.len() as u32;
                for c in 0..4 {
                    buf[out + c] = ((acc[c] + n / 2) / n) as u8;
                }
            }
        }
    }

    fn blur(&mut self, buf: &mut [u8], w: u32, h: u32, radius_px: u32, sigma: f32) -> IsoResult<()> {
        let radius_px = radius_px.min(MAX_BLUR_RADIUS);
        let key = BlurKernelKey {
            radius_px,
            sigma_bits: sigma.to_bits(),
        };
        let kernel = if let Some(k) = self.blur_kernels.get(&key).cloned() {
            k
        } else {
            let k = Arc::new(gaussian_kernel_q16(radius_px, sigma)?);
            self.blur_kernels.insert(key, Arc::clone(&k));
            k
        };
        if kernel.len() == 1 {
            return Ok(());
        }

        self.a.clear();
        self.a.extend_from_slice(buf);
        self.b.resize(buf.len(), 0);
        horizontal_blur_q16(&self.a, &mut self.b, w, h, &kernel);
        vertical_blur_q16(&self.b, buf, w, h, &kernel);
        Ok(())
    }
}

fn tint(buf: &mut [u8], color: Rgba8Premul, amount: f64) {
    let amt = if amount.is_finite() {
        amount.clamp(0.0, 1.0) as f32
    } else {
        0.0
    };
    if amt <= 0.0 {
        return;
    }
    let [r, g, b, _] = color.to_straight();
    let keep = 1.0 - amt;
    let m = [
        keep,
        0.0,
        0.0,
        0.0,
        amt * (r as f32 / 255.0),
        0.0,
        keep,
        0.0,
        0.0,
        amt * (g as f32 / 255.0),
        0.0,
        0.0,
        keep,
        0.0,
        amt * (b as f32 / 255.0),
        0.0,
        0.0,
        0.0,
        1.0,
        0.0,
    ];
    color_matrix_in_place(buf, m);
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> IsoResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(IsoError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(IsoError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/effects.rs"]
mod tests;
