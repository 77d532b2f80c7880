use crate::foundation::error::{IsoError, IsoResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

pub(crate) fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    let a16 = u16::from(a);
    let premul = |c: u8| -> u8 { (((u16::from(c) * a16) + 127) / 255) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn opacity_u16(opacity: f32) -> u16 {
    if !opacity.is_finite() {
        return 0;
    }
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

#[inline]
fn over_px(d: &mut [u8], s: &[u8], op: u16) {
    let sa = mul_div255_u8(u16::from(s[3]), op);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - u16::from(sa);

    d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
    for c in 0..3 {
        let sc = mul_div255_u8(u16::from(s[c]), op);
        let dc = mul_div255_u8(u16::from(d[c]), inv);
        d[c] = add_sat_u8(sc, dc);
    }
}

/// Premultiplied source-over of equal-sized buffers.
pub(crate) fn premul_over_in_place_opacity(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> IsoResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(IsoError::validation(
            "premul_over_in_place_opacity expects equal-length rgba8 buffers",
        ));
    }
    let op = opacity_u16(opacity);
    if op == 0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        over_px(d, s, op);
    }
    Ok(())
}

/// Where a source buffer lands in [`over_at`], and how strongly.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Placement {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) opacity: f32,
}

/// Source-over `src` (`src_w x src_h`) onto `dst` (`dst_w x dst_h`) with its top-left at
/// `(at.x, at.y)`. Pixels falling outside `dst` are dropped.
pub(crate) fn over_at(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    at: Placement,
) {
    debug_assert_eq!(dst.len(), (dst_w as usize) * (dst_h as usize) * 4);
    debug_assert_eq!(src.len(), (src_w as usize) * (src_h as usize) * 4);
    let op = opacity_u16(at.opacity);
    if op == 0 {
        return;
    }

    let x0 = i64::from(at.x).max(0);
    let y0 = i64::from(at.y).max(0);
    let x1 = (i64::from(at.x) + i64::from(src_w)).min(i64::from(dst_w));
    let y1 = (i64::from(at.y) + i64::from(src_h)).min(i64::from(dst_h));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let run = ((x1 - x0) as usize) * 4;
    for dy in y0..y1 {
        let sy = (dy - i64::from(at.y)) as usize;
        let sx = (x0 - i64::from(at.x)) as usize;
        let s_start = (sy * src_w as usize + sx) * 4;
        let d_start = (dy as usize * dst_w as usize + x0 as usize) * 4;
        let s_row = &src[s_start..s_start + run];
        let d_row = &mut dst[d_start..d_start + run];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            over_px(d, s, op);
        }
    }
}

/// Scale every premultiplied pixel by a single-channel coverage value.
pub(crate) fn apply_coverage_in_place(buf: &mut [u8], coverage: &[u8]) {
    debug_assert_eq!(buf.len(), coverage.len() * 4);
    for (px, &w) in buf.chunks_exact_mut(4).zip(coverage) {
        match w {
            255 => {}
            0 => px.fill(0),
            _ => {
                let w16 = u16::from(w);
                for c in px.iter_mut() {
                    *c = mul_div255_u8(u16::from(*c), w16);
                }
            }
        }
    }
}

/// Apply a 4x5 straight-alpha color matrix to premultiplied pixels.
pub(crate) fn color_matrix_in_place(buf: &mut [u8], m: [f32; 20]) {
    for px in buf.chunks_exact_mut(4) {
        let pr = px[0] as f32 / 255.0;
        let pg = px[1] as f32 / 255.0;
        let pb = px[2] as f32 / 255.0;
        let pa = px[3] as f32 / 255.0;

        // Convert premul -> straight for matrix application.
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = pr * inv_a;
        let g = pg * inv_a;
        let b = pb * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        px[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
