use super::*;

fn single_dot(w: u32, h: u32, x: u32, y: u32) -> Vec<u8> {
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let i = ((y * w + x) * 4) as usize;
    buf[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
    buf
}

#[test]
fn warp_below_threshold_is_noop() {
    let mut fx = EffectScratch::new();
    let mut buf = single_dot(9, 9, 4, 4);
    let before = buf.clone();
    fx.apply(
        &ViewportEffect::VelocityWarp {
            velocity: Vec2::new(0.3, 0.3),
            strength: 100.0,
        },
        &mut buf,
        9,
        9,
    )
    .unwrap();
    assert_eq!(buf, before);
}

#[test]
fn warp_streaks_ahead_of_the_dot() {
    // Moving right: each pixel averages samples trailing to its left, so the dot smears to
    // the right and nothing appears to its left.
    let mut fx = EffectScratch::new();
    let mut buf = single_dot(16, 3, 4, 1);
    fx.apply(
        &ViewportEffect::VelocityWarp {
            velocity: Vec2::new(4.0, 0.0),
            strength: 1.0,
        },
        &mut buf,
        16,
        3,
    )
    .unwrap();
    let alpha = |x: u32| buf[((16 + x) * 4 + 3) as usize];
    assert!(alpha(6) > 0);
    assert_eq!(alpha(2), 0);
    assert_eq!(buf[3], 0, "other rows stay empty");
}

#[test]
fn tint_full_amount_replaces_color_and_keeps_alpha() {
    let mut fx = EffectScratch::new();
    let mut buf = vec![0, 0, 200, 200, 0, 0, 0, 0];
    fx.apply(
        &ViewportEffect::Tint {
            color: Rgba8Premul::opaque(255, 0, 0),
            amount: 1.0,
        },
        &mut buf,
        2,
        1,
    )
    .unwrap();
    assert_eq!(buf, vec![200, 0, 0, 200, 0, 0, 0, 0]);
}

#[test]
fn tint_zero_amount_is_noop() {
    let mut fx = EffectScratch::new();
    let mut buf = vec![10, 20, 30, 255];
    fx.apply(
        &ViewportEffect::Tint {
            color: Rgba8Premul::opaque(255, 0, 0),
            amount: 0.0,
        },
        &mut buf,
        1,
        1,
    )
    .unwrap();
    assert_eq!(buf, vec![10, 20, 30, 255]);
}

#[test]
fn effect_order_is_visible() {
    let red = ViewportEffect::Tint {
        color: Rgba8Premul::opaque(255, 0, 0),
        amount: 1.0,
    };
    let half_blue = ViewportEffect::Tint {
        color: Rgba8Premul::opaque(0, 0, 255),
        amount: 0.5,
    };
    let run = |effects: &[ViewportEffect]| {
        let mut fx = EffectScratch::new();
        let mut buf = vec![0, 255, 0, 255];
        for e in effects {
            fx.apply(e, &mut buf, 1, 1).unwrap();
        }
        buf
    };
    assert_eq!(run(&[half_blue, red]), vec![255, 0, 0, 255]);
    assert_ne!(run(&[red, half_blue]), vec![255, 0, 0, 255]);
}

#[test]
fn blur_spreads_symmetrically_and_zero_radius_is_identity() {
    let mut fx = EffectScratch::new();
    let mut buf = single_dot(9, 9, 4, 4);
    let before = buf.clone();
    fx.apply(
        &ViewportEffect::Blur {
            radius_px: 0,
            sigma: 1.0,
        },
        &mut buf,
        9,
        9,
    )
    .unwrap();
    assert_eq!(buf, before);

    fx.apply(
        &ViewportEffect::Blur {
            radius_px: 2,
            sigma: 1.0,
        },
        &mut buf,
        9,
        9,
    )
    .unwrap();
    let a = |x: u32, y: u32| buf[((y * 9 + x) * 4 + 3) as usize];
    assert!(a(4, 4) < 255);
    assert!(a(3, 4) > 0);
    assert_eq!(a(3, 4), a(5, 4));
    assert_eq!(a(4, 3), a(4, 5));
    assert_eq!(a(0, 0), 0);
}

#[test]
fn blur_rejects_bad_sigma() {
    let mut fx = EffectScratch::new();
    let mut buf = vec![0u8; 4];
    let err = fx.apply(
        &ViewportEffect::Blur {
            radius_px: 3,
            sigma: 0.0,
        },
        &mut buf,
        1,
        1,
    );
    assert!(matches!(err, Err(IsoError::Validation(_))));
}

#[test]
fn kernel_is_normalized() {
    let k = gaussian_kernel_q16(5, 2.0).unwrap();
    assert_eq!(k.len(), 11);
    assert_eq!(k.iter().map(|&v| u64::from(v)).sum::<u64>(), 65536);
    assert_eq!(k[0], k[10]);
}
