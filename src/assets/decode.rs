use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::IsoResult;

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub(crate) struct DecodedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

/// Decode PNG/JPEG (anything `image` recognizes) and premultiply.
pub(crate) fn decode_image(bytes: &[u8]) -> IsoResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode sprite image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
