use super::*;

#[test]
fn over_opaque_source_replaces_destination() {
    let mut dst = vec![10, 20, 30, 255, 0, 0, 0, 0];
    let src = vec![200, 100, 50, 255, 200, 100, 50, 255];
    premul_over_in_place_opacity(&mut dst, &src, 1.0).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn over_half_transparent_source_blends() {
    let mut dst = vec![0, 0, 255, 255];
    let src = vec![128, 0, 0, 128];
    premul_over_in_place_opacity(&mut dst, &src, 1.0).unwrap();
    assert_eq!(dst[3], 255);
    assert_eq!(dst[0], 128);
    assert_eq!(dst[2], 127);
}

#[test]
fn zero_opacity_and_mismatched_lengths() {
    let mut dst = vec![1, 2, 3, 4];
    premul_over_in_place_opacity(&mut dst, &[255, 255, 255, 255], 0.0).unwrap();
    assert_eq!(dst, vec![1, 2, 3, 4]);
    assert!(premul_over_in_place_opacity(&mut dst, &[0; 8], 1.0).is_err());
}

#[test]
fn over_at_clips_to_destination() {
    // 3x3 destination, 2x2 opaque red source placed at (2, -1): only (2,0) is covered.
    let mut dst = vec![0u8; 3 * 3 * 4];
    let src = [255u8, 0, 0, 255].repeat(4);
    over_at(
        &mut dst,
        3,
        3,
        &src,
        2,
        2,
        Placement {
            x: 2,
            y: -1,
            opacity: 1.0,
        },
    );
    let covered: Vec<usize> = dst
        .chunks_exact(4)
        .enumerate()
        .filter(|(_, px)| px[3] != 0)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(covered, vec![2]);
}

#[test]
fn over_at_fully_outside_is_noop() {
    let mut dst = vec![0u8; 2 * 2 * 4];
    let src = [255u8; 4].repeat(4);
    over_at(
        &mut dst,
        2,
        2,
        &src,
        2,
        2,
        Placement {
            x: -5,
            y: 0,
            opacity: 1.0,
        },
    );
    assert!(dst.iter().all(|&b| b == 0));
}

#[test]
fn coverage_scales_premultiplied_pixels() {
    let mut buf = [200u8, 100, 50, 255].repeat(3);
    apply_coverage_in_place(&mut buf, &[255, 0, 128]);
    assert_eq!(&buf[0..4], &[200, 100, 50, 255]);
    assert_eq!(&buf[4..8], &[0, 0, 0, 0]);
    assert_eq!(buf[11], 128);
}

#[test]
fn identity_color_matrix_preserves_opaque_pixels() {
    let mut id = [0.0f32; 20];
    id[0] = 1.0;
    id[6] = 1.0;
    id[12] = 1.0;
    id[18] = 1.0;
    let mut buf = vec![10, 200, 33, 255];
    color_matrix_in_place(&mut buf, id);
    assert_eq!(buf, vec![10, 200, 33, 255]);
}

#[test]
fn premul_rounds_like_straight_conversion() {
    assert_eq!(premul_rgba8([255, 0, 128, 128]), [128, 0, 64, 128]);
    assert_eq!(premul_rgba8([9, 9, 9, 0]), [0, 0, 0, 0]);
}
