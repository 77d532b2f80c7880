use super::*;

const EPS: f64 = 1e-9;

fn screen() -> Canvas {
    Canvas {
        width: 640,
        height: 480,
    }
}

#[test]
fn tile_to_world_matches_isometric_formula() {
    let p = IsoProjection::default();
    let w = p.tile_to_world(TileCoord::new(3, 1), 2);
    assert_eq!(w, Point::new(2.0 * 32.0, 4.0 * 16.0 - 2.0 * 16.0));
}

#[test]
fn world_to_tile_inverts_tile_to_world_at_height_zero() {
    let p = IsoProjection::default();
    for x in -12..=12 {
        for y in -12..=12 {
            let t = TileCoord::new(x, y);
            let back = p.world_to_tile_f(p.tile_to_world(t, 0));
            assert!((back.x - f64::from(x)).abs() < EPS);
            assert!((back.y - f64::from(y)).abs() < EPS);
            assert_eq!(p.world_to_tile(p.tile_to_world(t, 0)), t);
        }
    }
}

#[test]
fn height_hint_recovers_lifted_tiles() {
    let p = IsoProjection::default();
    let t = TileCoord::new(4, -2);
    let w = p.tile_to_world(t, 3);
    assert_eq!(p.world_to_tile_at_height(w, 3).round(), t);
    assert_ne!(p.world_to_tile(w), t);
}

#[test]
fn screen_roundtrip_holds_for_any_positive_zoom() {
    let p = IsoProjection::default();
    for zoom in [0.25, 0.5, 1.0, 1.75, 4.0] {
        let cam = Camera::new(Vec2::new(-130.5, 77.25), zoom);
        for x in -6..=6 {
            for y in -6..=6 {
                let t = TileCoord::new(x, y);
                let s = p.tile_to_screen(t, 0, &cam, screen());
                assert_eq!(p.screen_to_tile(s, &cam, screen()), t);
            }
        }
    }
}

#[test]
fn camera_world_screen_are_inverse() {
    let cam = Camera::new(Vec2::new(12.0, -40.0), 2.5);
    let w = Point::new(101.25, -3.5);
    let back = cam.screen_to_world(cam.world_to_screen(w, screen()), screen());
    assert!((back.x - w.x).abs() < EPS);
    assert!((back.y - w.y).abs() < EPS);
}

#[test]
fn camera_affine_agrees_with_point_mapping() {
    let cam = Camera::new(Vec2::new(12.0, -40.0), 2.5);
    let w = Point::new(7.0, 9.0);
    let a = cam.world_to_screen_affine(screen()) * w;
    let b = cam.world_to_screen(w, screen());
    assert!((a.x - b.x).abs() < EPS);
    assert!((a.y - b.y).abs() < EPS);
}

#[test]
fn clicks_inside_diamond_resolve_to_that_tile() {
    let p = IsoProjection::default();
    let cam = Camera::default();
    let t = TileCoord::new(5, 5);
    let center = p.tile_to_screen(t, 0, &cam, screen());
    assert_eq!(p.screen_to_tile(center, &cam, screen()), t);

    // Halfway from the centre to the midpoint of each diamond edge.
    let (qw, qh) = (p.tile_width / 4.0, p.tile_height / 4.0);
    for (dx, dy) in [(qw, qh), (qw, -qh), (-qw, qh), (-qw, -qh)] {
        let q = Point::new(center.x + dx * 0.5, center.y + dy * 0.5);
        assert_eq!(p.screen_to_tile(q, &cam, screen()), t, "offset ({dx}, {dy})");
    }
}

#[test]
fn sub_tile_offset_moves_between_tile_centres() {
    let p = IsoProjection::default();
    let cam = Camera::default();
    let a = p.tile_to_screen(TileCoord::new(2, 2), 0, &cam, screen());
    let b = p.tile_to_screen(TileCoord::new(3, 2), 0, &cam, screen());
    let mid = p.tile_pos_to_screen(
        TilePos::offset(TileCoord::new(2, 2), Vec2::new(0.5, 0.0)),
        0.0,
        &cam,
        screen(),
    );
    assert!((mid.x - (a.x + b.x) / 2.0).abs() < EPS);
    assert!((mid.y - (a.y + b.y) / 2.0).abs() < EPS);
}

#[test]
fn diamond_vertices_surround_centre() {
    let p = IsoProjection::default();
    let [top, right, bottom, left] = p.tile_diamond(TileCoord::new(0, 0), 0);
    assert_eq!(top, Point::new(0.0, -16.0));
    assert_eq!(right, Point::new(32.0, 0.0));
    assert_eq!(bottom, Point::new(0.0, 16.0));
    assert_eq!(left, Point::new(-32.0, 0.0));
}
