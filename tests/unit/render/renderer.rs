use super::*;
use crate::assets::sprite::NoAssets;

#[test]
fn partial_json_keeps_defaults() {
    let opts = RendererOpts::from_reader(
        br#"{"debug_overlay":true,"surface_pool":{"max_pool_bytes":1024}}"#.as_slice(),
    )
    .unwrap();
    assert!(opts.debug_overlay);
    assert_eq!(opts.surface_pool.max_pool_bytes, 1024);
    assert_eq!(
        opts.surface_pool.max_surfaces_per_bucket,
        SurfacePoolOpts::default().max_surfaces_per_bucket
    );
    assert_eq!(opts.clear_rgba, [0, 0, 0, 255]);
    assert_eq!(opts.projection, IsoProjection::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = RendererOpts::from_reader(b"{".as_slice()).unwrap_err();
    assert!(matches!(err, IsoError::Serde(_)));
}

#[test]
fn missing_options_file_carries_context() {
    let err = RendererOpts::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, IsoError::Other(_)));
    assert!(err.to_string().contains("open renderer options"));
}

#[test]
fn env_overrides_apply_and_bad_values_are_ignored() {
    let opts = RendererOpts::default().apply_env_from(|k| match k {
        "ISOFRAME_DEBUG_OVERLAY" => Some("true".to_owned()),
        "ISOFRAME_POOL_MAX_BYTES" => Some("4096".to_owned()),
        _ => None,
    });
    assert!(opts.debug_overlay);
    assert_eq!(opts.surface_pool.max_pool_bytes, 4096);

    let kept = opts.apply_env_from(|k| match k {
        "ISOFRAME_DEBUG_OVERLAY" => Some("maybe".to_owned()),
        "ISOFRAME_POOL_MAX_BYTES" => Some("lots".to_owned()),
        _ => None,
    });
    assert_eq!(kept, opts);
}

#[test]
fn invalid_projection_is_rejected() {
    let mut opts = RendererOpts::default();
    opts.projection.tile_width = 0.0;
    assert!(matches!(
        Renderer::new(opts, 8, 8).unwrap_err(),
        IsoError::Validation(_)
    ));
    assert!(
        RendererOpts::default()
            .with_edge_blend_max_px(f64::NAN)
            .validate()
            .is_err()
    );
}

#[test]
fn failed_resize_keeps_the_old_size() {
    let mut r = Renderer::new(RendererOpts::default(), 16, 8).unwrap();
    assert!(r.resize(0, 8).is_err());
    assert_eq!(r.canvas(), Canvas { width: 16, height: 8 });
    let frame = r.render_frame(&[], &Camera::default(), &NoAssets).unwrap();
    assert_eq!((frame.frame.width, frame.frame.height), (16, 8));
}

#[test]
fn empty_frame_is_the_clear_color() {
    let mut r = Renderer::new(
        RendererOpts::default().with_clear_rgba([10, 20, 30, 255]),
        4,
        4,
    )
    .unwrap();
    let out = r.render_frame(&[], &Camera::default(), &NoAssets).unwrap();
    assert!(out.frame.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    assert!(out.diagnostics.is_clean());
}

#[test]
fn broken_camera_falls_back() {
    let c = sanitize_camera(&Camera::new(Vec2::new(f64::NAN, 3.0), -1.0));
    assert_eq!(c, Camera::default());
    let ok = Camera::new(Vec2::new(5.0, 6.0), 2.0);
    assert_eq!(sanitize_camera(&ok), ok);
}

#[test]
fn mask_cache_cap_reaches_the_compositor() {
    let opts = RendererOpts::from_reader(br#"{"mask_cache_max_entries":3}"#.as_slice()).unwrap();
    let r = Renderer::new(opts, 8, 8).unwrap();
    assert_eq!(r.compositor().mask_cache().max_entries(), 3);

    let r = Renderer::new(RendererOpts::default(), 8, 8).unwrap();
    assert_eq!(
        r.compositor().mask_cache().max_entries(),
        DEFAULT_MASK_CACHE_ENTRIES
    );
}
