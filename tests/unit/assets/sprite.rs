use std::io::Cursor;

use super::*;
use crate::animation::sheet::AnimationSequence;

fn sheet_4x2() -> SpriteAsset {
    // 4 frames of 2x2 in a 4x4 sheet; frame n is filled with value n+1.
    let mut data = vec![0u8; 4 * 4 * 4];
    for y in 0..4u32 {
        for x in 0..4u32 {
            let frame = (y / 2) * 2 + (x / 2);
            let i = ((y * 4 + x) * 4) as usize;
            data[i..i + 4].copy_from_slice(&[frame as u8 + 1, 0, 0, 255]);
        }
    }
    SpriteAsset::from_premul_rgba8(4, 4, data)
        .unwrap()
        .with_frame_grid(2, 2)
        .unwrap()
}

#[test]
fn frame_grid_slices_row_major() {
    let s = sheet_4x2();
    assert_eq!(s.frame_count(), 4);
    assert_eq!(s.columns(), 2);
    for f in 0..4u32 {
        let px = s.frame_pixels(f);
        assert_eq!(px.len(), 2 * 2 * 4);
        assert!(px.chunks_exact(4).all(|p| p[0] == f as u8 + 1));
    }
    // Out-of-range frames wrap.
    assert_eq!(s.frame_pixels(5), s.frame_pixels(1));
}

#[test]
fn uneven_grid_is_rejected() {
    let s = SpriteAsset::from_premul_rgba8(5, 4, vec![0; 5 * 4 * 4]).unwrap();
    assert!(matches!(
        s.with_frame_grid(2, 2),
        Err(IsoError::Asset(_))
    ));
}

#[test]
fn byte_len_is_validated() {
    assert!(SpriteAsset::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(SpriteAsset::from_premul_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn default_anchor_is_diamond_centre() {
    let s = SpriteAsset::from_premul_rgba8(64, 32, vec![0; 64 * 32 * 4]).unwrap();
    assert_eq!(s.anchor(), Point::new(32.0, 16.0));
    let tall = SpriteAsset::from_premul_rgba8(64, 96, vec![0; 64 * 96 * 4]).unwrap();
    assert_eq!(tall.anchor(), Point::new(32.0, 80.0));
}

#[test]
fn store_resolves_inserted_and_encoded_sprites() {
    let mut store = SpriteStore::new();
    assert!(store.sprite("grass").is_none());

    let def = AnimationDef::new().with(
        "idle",
        AnimationSequence {
            start_frame: 0,
            frame_count: 4,
            fps: 8.0,
        },
    );
    store.insert("hero", sheet_4x2().with_animations(def));

    let img = image::RgbaImage::from_raw(1, 1, vec![10, 20, 30, 255]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    store.insert_encoded("dot", &buf).unwrap();

    assert_eq!(store.len(), 2);
    let hero = store.sprite("hero").unwrap();
    assert!(hero.animations().and_then(|a| a.get("idle")).is_some());
    assert_eq!(store.sprite("dot").unwrap().frame_size(), (1, 1));
    assert!(store.font().is_none());
    assert!(NoAssets.sprite("hero").is_none());
}
