use crate::foundation::error::IsoResult;
use crate::render::composite::premul_over_in_place_opacity;
use crate::render::surface::Surface;

/// Layer used in place of a non-finite one, inside the scene band.
pub(crate) const SCENE_FALLBACK_LAYER: f64 = 62.5;

/// Parallax depth group, back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthBand {
    DeepBackground,
    MidBackground,
    Scene,
    Foreground,
}

impl DepthBand {
    /// Back-to-front order.
    pub const ALL: [DepthBand; 4] = [
        DepthBand::DeepBackground,
        DepthBand::MidBackground,
        DepthBand::Scene,
        DepthBand::Foreground,
    ];

    /// Map a continuous layer (nominally `0..=100`) onto a band: `< 25` deep background,
    /// `< 50` mid background, `< 75` scene, anything else foreground. Non-finite layers land in
    /// the scene band.
    pub fn from_layer(layer: f64) -> Self {
        if !layer.is_finite() {
            return Self::Scene;
        }
        if layer < 25.0 {
            Self::DeepBackground
        } else if layer < 50.0 {
            Self::MidBackground
        } else if layer < 75.0 {
            Self::Scene
        } else {
            Self::Foreground
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One persistent offscreen buffer per [`DepthBand`], cleared and reused every frame.
#[derive(Debug)]
pub struct DepthLayerSet {
    bands: [Surface; 4],
}

impl DepthLayerSet {
    pub fn new(width: u32, height: u32) -> IsoResult<Self> {
        Ok(Self {
            bands: [
                Surface::new(width, height)?,
                Surface::new(width, height)?,
                Surface::new(width, height)?,
                Surface::new(width, height)?,
            ],
        })
    }

    pub fn width(&self) -> u32 {
        self.bands[0].width()
    }

    pub fn height(&self) -> u32 {
        self.bands[0].height()
    }

    /// Reallocate every band. On failure the previous buffers are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> IsoResult<()> {
        if width == self.width() && height == self.height() {
            self.clear();
            return Ok(());
        }
        *self = Self::new(width, height)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        for b in &mut self.bands {
            b.clear_transparent();
        }
    }

    /// Premultiplied RGBA8 pixels of one band.
    pub fn band_pixels(&self, band: DepthBand) -> &[u8] {
        self.bands[band.index()].data()
    }

    pub fn band_pixels_mut(&mut self, band: DepthBand) -> &mut [u8] {
        self.bands[band.index()].data_mut()
    }

    pub(crate) fn band(&self, band: DepthBand) -> &Surface {
        &self.bands[band.index()]
    }

    pub(crate) fn band_mut(&mut self, band: DepthBand) -> &mut Surface {
        &mut self.bands[band.index()]
    }

    /// Source-over every band onto `out`, back to front.
    pub(crate) fn composite_into(&self, out: &mut Surface) -> IsoResult<()> {
        for band in DepthBand::ALL {
            premul_over_in_place_opacity(out.data_mut(), self.band(band).data(), 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layers.rs"]
mod tests;
