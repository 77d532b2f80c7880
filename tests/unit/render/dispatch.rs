use super::*;
use crate::foundation::core::{Point, Rect, Rgba8Premul, Vec2};
use crate::mask::shape::ViewportShape;
use crate::render::command::{IsoEntity, IsoTile, UiElement};
use crate::transform::iso::TileCoord;
use crate::viewport::config::ViewportConfig;

const SCREEN: Canvas = Canvas {
    width: 640,
    height: 480,
};

fn tile(x: i32, y: i32) -> DrawCommand {
    IsoTile::new(TileCoord::new(x, y)).into()
}

fn ui(z: i32) -> DrawCommand {
    UiElement {
        rect: Rect::new(0.0, 0.0, 0.5, 0.5),
        z,
        color: Some(Rgba8Premul::opaque(1, 1, 1)),
        sprite: None,
    }
    .into()
}

fn order(cmds: &[DrawCommand]) -> Vec<usize> {
    sort_commands(cmds, &Camera::default(), &IsoProjection::default(), SCREEN)
}

#[test]
fn rows_paint_back_to_front() {
    // (2,2) is further down the screen than (0,0) and (1,0).
    let cmds = vec![tile(2, 2), tile(0, 0), tile(1, 0)];
    assert_eq!(order(&cmds), vec![1, 2, 0]);
}

#[test]
fn equal_keys_keep_submission_order() {
    // Same row: (1,0) and (0,1) project to the same screen-Y.
    let cmds = vec![tile(1, 0), tile(0, 1), tile(1, 0)];
    assert_eq!(order(&cmds), vec![0, 1, 2]);
    let reversed = vec![tile(0, 1), tile(1, 0)];
    assert_eq!(order(&reversed), vec![0, 1]);
}

#[test]
fn layer_beats_screen_position_and_ui_beats_world() {
    let cmds = vec![
        ui(0),
        IsoTile::new(TileCoord::new(0, 0)).with_layer(1).into(),
        tile(30, 30),
        ui(-2),
    ];
    assert_eq!(order(&cmds), vec![2, 1, 3, 0]);
}

#[test]
fn stacked_tiles_paint_bottom_up_and_entities_over_their_tile() {
    let mut hero = IsoEntity::new(TileCoord::new(4, 4));
    hero.height = 1.0;
    let cmds = vec![
        hero.into(),
        IsoTile::new(TileCoord::new(4, 4)).with_height(1).into(),
        tile(4, 4),
    ];
    assert_eq!(order(&cmds), vec![2, 1, 0]);
}

#[test]
fn sub_tile_offsets_move_entities_between_rows() {
    let mut behind = IsoEntity::new(TileCoord::new(3, 3));
    behind.offset = Vec2::new(-0.9, -0.9);
    let cmds = vec![behind.into(), tile(2, 3)];
    // The entity has slid more than a row back, so the tile paints over it.
    assert_eq!(order(&cmds), vec![0, 1]);
}

#[test]
fn unknown_and_malformed_commands_are_skipped_not_fatal() {
    let cmds = vec![
        tile(0, 0),
        DrawCommand::Unknown,
        UiElement {
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            z: 0,
            color: None,
            sprite: None,
        }
        .into(),
        tile(1, 1),
    ];
    let plan = plan_dispatch(&cmds, &IsoProjection::default(), &Camera::default(), SCREEN);
    assert_eq!(plan.order, vec![0, 3]);
    assert_eq!(
        plan.skipped.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn routes_split_by_destination() {
    let vp = ViewportConfig::new(
        "window",
        ViewportShape::Circle { radius: 4.0 },
        Point::new(1.0, 1.0),
    );
    let cmds = vec![ui(0), vp.clone().into(), tile(0, 0), vp.with_layer(10.0).into()];
    let plan = plan_dispatch(&cmds, &IsoProjection::default(), &Camera::default(), SCREEN);
    assert_eq!(plan.world, vec![2]);
    assert_eq!(plan.viewports, vec![3, 1]);
    assert_eq!(plan.overlay, vec![0]);
}
