use super::*;

#[test]
fn unknown_kinds_decode_to_unknown() {
    let cmds = DrawCommand::parse_list(
        r#"[
            {"kind":"iso_tile","tile":{"x":1,"y":2},"height":1},
            {"kind":"hologram","flux":3},
            {"kind":"ui","rect":"not a rect"},
            {"kind":"flat_rect","rect":{"x0":0,"y0":0,"x1":4,"y1":4},"color":{"r":1,"g":2,"b":3,"a":255}}
        ]"#,
    )
    .unwrap();
    assert_eq!(cmds.len(), 4);
    assert_eq!(
        cmds[0],
        DrawCommand::IsoTile(IsoTile::new(TileCoord::new(1, 2)).with_height(1))
    );
    assert_eq!(cmds[1], DrawCommand::Unknown);
    assert_eq!(cmds[2], DrawCommand::Unknown);
    assert_eq!(cmds[3].kind(), "flat_rect");
    assert_eq!(cmds[1].defect(), Some("unrecognized command kind"));
}

#[test]
fn whole_list_must_be_json_array() {
    assert!(matches!(
        DrawCommand::parse_list("{}"),
        Err(IsoError::Serde(_))
    ));
}

#[test]
fn primitive_json_nests_a_shape_tag() {
    let cmd: DrawCommand = serde_json::from_str(
        r#"{"kind":"primitive","z":2,"color":{"r":255,"g":0,"b":0,"a":255},
            "shape":{"type":"circle","center":{"x":5,"y":5},"radius":3}}"#,
    )
    .unwrap();
    let DrawCommand::Primitive(p) = cmd else {
        panic!("expected primitive");
    };
    assert_eq!(p.z, 2);
    assert!(matches!(
        p.shape,
        PrimitiveShape::Circle { stroke: None, .. }
    ));
}

#[test]
fn defects_catch_malformed_payloads() {
    let empty_ui = DrawCommand::Ui(UiElement {
        rect: Rect::new(0.2, 0.2, 0.2, 0.5),
        z: 0,
        color: None,
        sprite: None,
    });
    assert_eq!(empty_ui.defect(), Some("empty ui rect"));

    let mut e = IsoEntity::new(TileCoord::new(0, 0));
    e.offset = Vec2::new(f64::NAN, 0.0);
    assert!(DrawCommand::IsoEntity(e).defect().is_some());

    let line = DrawCommand::Primitive(ScreenPrimitive {
        shape: PrimitiveShape::Line {
            from: Point::ZERO,
            to: Point::new(3.0, 0.0),
            width: 0.0,
        },
        color: Rgba8Premul::opaque(0, 0, 0),
        z: 0,
    });
    assert_eq!(line.defect(), Some("malformed line"));

    assert_eq!(
        DrawCommand::IsoTile(IsoTile::new(TileCoord::new(3, 3))).defect(),
        None
    );
}
