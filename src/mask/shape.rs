use crate::foundation::core::{Point, Rect};

/// Default sample count for the dome arch.
pub const DEFAULT_DOME_SEGMENTS: u32 = 32;

fn default_dome_segments() -> u32 {
    DEFAULT_DOME_SEGMENTS
}

/// Declarative viewport outline in viewport-local pixels, bounds anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportShape {
    Rect {
        width: f64,
        height: f64,
    },
    Circle {
        radius: f64,
    },
    Ellipse {
        rx: f64,
        ry: f64,
    },
    /// Rectangular body topped by a quadratic arch. The arch spans the full width and rises
    /// `arch_height` above the body; its apex touches the top of the bounds.
    Dome {
        width: f64,
        height: f64,
        arch_height: f64,
        #[serde(default = "default_dome_segments")]
        segments: u32,
    },
}

impl ViewportShape {
    pub fn dome(width: f64, height: f64, arch_height: f64) -> Self {
        Self::Dome {
            width,
            height,
            arch_height,
            segments: DEFAULT_DOME_SEGMENTS,
        }
    }

    /// Local bounding box, always starting at the origin.
    pub fn bounds(&self) -> Rect {
        let (w, h) = match *self {
            Self::Rect { width, height } => (width, height),
            Self::Circle { radius } => (radius * 2.0, radius * 2.0),
            Self::Ellipse { rx, ry } => (rx * 2.0, ry * 2.0),
            Self::Dome { width, height, .. } => (width, height),
        };
        if self.is_degenerate() {
            return Rect::ZERO;
        }
        Rect::new(0.0, 0.0, w, h)
    }

    /// Non-finite or non-positive extents. Such shapes cover nothing.
    pub fn is_degenerate(&self) -> bool {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        match *self {
            Self::Rect { width, height } => !(ok(width) && ok(height)),
            Self::Circle { radius } => !ok(radius),
            Self::Ellipse { rx, ry } => !(ok(rx) && ok(ry)),
            Self::Dome {
                width,
                height,
                arch_height,
                ..
            } => !(ok(width) && ok(height) && arch_height.is_finite()),
        }
    }

    /// Analytic point containment in local coordinates. Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        if self.is_degenerate() || !p.x.is_finite() || !p.y.is_finite() {
            return false;
        }
        match *self {
            Self::Rect { width, height } => {
                p.x >= 0.0 && p.y >= 0.0 && p.x <= width && p.y <= height
            }
            Self::Circle { radius } => {
                let dx = p.x - radius;
                let dy = p.y - radius;
                dx * dx + dy * dy <= radius * radius
            }
            Self::Ellipse { rx, ry } => {
                let nx = (p.x - rx) / rx;
                let ny = (p.y - ry) / ry;
                nx * nx + ny * ny <= 1.0
            }
            Self::Dome {
                width,
                height,
                arch_height,
                ..
            } => {
                if p.x < 0.0 || p.x > width || p.y > height {
                    return false;
                }
                p.y >= dome_arch_y(width, height, arch_height, p.x)
            }
        }
    }

    /// Outline as a path scaled from `bounds()` to `(w, h)`.
    pub(crate) fn outline(&self, w: f64, h: f64) -> vello_cpu::kurbo::BezPath {
        use vello_cpu::kurbo::{BezPath, Ellipse, Shape};

        let b = self.bounds();
        let sx = if b.width() > 0.0 { w / b.width() } else { 0.0 };
        let sy = if b.height() > 0.0 { h / b.height() } else { 0.0 };

        let mut p = BezPath::new();
        match *self {
            Self::Rect { .. } => {
                p.move_to((0.0, 0.0));
                p.line_to((w, 0.0));
                p.line_to((w, h));
                p.line_to((0.0, h));
                p.close_path();
            }
            Self::Circle { .. } | Self::Ellipse { .. } => {
                let e = Ellipse::new((w / 2.0, h / 2.0), (w / 2.0, h / 2.0), 0.0);
                for el in e.path_elements(0.1) {
                    p.push(el);
                }
            }
            Self::Dome {
                width,
                height,
                arch_height,
                segments,
            } => {
                let segments = segments.max(1);
                let base = arch_base(height, arch_height);
                p.move_to((0.0, h));
                p.line_to((0.0, base * sy));
                for i in 1..=segments {
                    let x = width * f64::from(i) / f64::from(segments);
                    let y = dome_arch_y(width, height, arch_height, x);
                    p.line_to((x * sx, y * sy));
                }
                p.line_to((w, h));
                p.close_path();
            }
        }
        p
    }
}

fn arch_base(height: f64, arch_height: f64) -> f64 {
    arch_height.clamp(0.0, height)
}

/// Top edge of the dome at `x`: the quadratic from `(0, a)` via control `(w/2, -a)` to `(w, a)`.
/// With the control point centred the curve is `y = a * (1 - 2x/w)^2`.
fn dome_arch_y(width: f64, height: f64, arch_height: f64, x: f64) -> f64 {
    let a = arch_base(height, arch_height);
    let t = 1.0 - 2.0 * (x / width);
    a * t * t
}

/// Binary visibility raster, one byte per pixel (0 or 255).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize).saturating_mul(height as usize)],
        }
    }

    /// Coverage at `(x, y)`; 0 outside the raster.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    pub fn covered_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

const COVERAGE_THRESHOLD: u8 = 128;

/// Rasterize `shape` scaled to `w x h` and threshold at half coverage.
///
/// Degenerate shapes and zero-sized rasters produce an all-zero mask without touching the
/// rasterizer. Sizes the rasterizer cannot address fall back to sampling `contains` at pixel
/// centres.
pub fn generate_mask(shape: &ViewportShape, w: u32, h: u32) -> Mask {
    if shape.is_degenerate() || w == 0 || h == 0 {
        return Mask::empty(w, h);
    }
    let (Ok(w16), Ok(h16)) = (u16::try_from(w), u16::try_from(h)) else {
        return sample_mask(shape, w, h);
    };

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    ctx.fill_path(&shape.outline(f64::from(w), f64::from(h)));
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);

    let data = pixmap
        .data_as_u8_slice()
        .chunks_exact(4)
        .map(|px| if px[3] >= COVERAGE_THRESHOLD { 255 } else { 0 })
        .collect();
    Mask {
        width: w,
        height: h,
        data,
    }
}

fn sample_mask(shape: &ViewportShape, w: u32, h: u32) -> Mask {
    let b = shape.bounds();
    let sx = b.width() / f64::from(w);
    let sy = b.height() / f64::from(h);
    let mut mask = Mask::empty(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = Point::new((f64::from(x) + 0.5) * sx, (f64::from(y) + 0.5) * sy);
            if shape.contains(p) {
                mask.data[(y as usize) * (w as usize) + x as usize] = 255;
            }
        }
    }
    mask
}

#[cfg(test)]
#[path = "../../tests/unit/mask/shape.rs"]
mod tests;
