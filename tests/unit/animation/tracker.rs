use super::*;
use crate::animation::sheet::AnimationDef;

fn walk_def() -> AnimationDef {
    AnimationDef::new()
        .with(
            "walk",
            AnimationSequence {
                start_frame: 4,
                frame_count: 4,
                fps: 10.0,
            },
        )
        .with(
            "idle",
            AnimationSequence {
                start_frame: 0,
                frame_count: 2,
                fps: 0.0,
            },
        )
}

fn lookup(def: &AnimationDef) -> impl Fn(&str, &str) -> Option<AnimationSequence> + '_ {
    move |_sprite, anim| def.get(anim).copied()
}

#[test]
fn advances_one_frame_per_period_and_wraps() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(1);
    t.ensure(e, "hero", "walk");

    let mut seen = Vec::new();
    for _ in 0..5 {
        t.update(0.1, lookup(&def));
        seen.push(t.get(e).unwrap().frame_index);
    }
    assert_eq!(seen, vec![1, 2, 3, 0, 1]);
}

#[test]
fn partial_periods_accumulate() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(2);
    t.ensure(e, "hero", "walk");

    t.update(0.05, lookup(&def));
    assert_eq!(t.get(e).unwrap().frame_index, 0);
    t.update(0.05, lookup(&def));
    assert_eq!(t.get(e).unwrap().frame_index, 1);
}

#[test]
fn zero_fps_never_advances() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(3);
    t.ensure(e, "hero", "idle");
    t.update(1_000.0, lookup(&def));
    assert_eq!(t.get(e).unwrap().frame_index, 0);
}

#[test]
fn switching_animation_resets_progress() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(4);
    t.ensure(e, "hero", "walk");
    t.update(0.25, lookup(&def));
    assert_eq!(t.get(e).unwrap().frame_index, 2);

    t.ensure(e, "hero", "idle");
    let s = t.get(e).unwrap();
    assert_eq!(s.frame_index, 0);
    assert_eq!(s.elapsed, 0.0);

    t.ensure(e, "hero", "walk");
    t.update(0.1, lookup(&def));
    t.ensure(e, "villain", "walk");
    assert_eq!(t.get(e).unwrap().frame_index, 0);
}

#[test]
fn re_ensuring_same_animation_keeps_progress() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(5);
    t.ensure(e, "hero", "walk");
    t.update(0.1, lookup(&def));
    t.ensure(e, "hero", "walk");
    assert_eq!(t.get(e).unwrap().frame_index, 1);
}

#[test]
fn paused_entities_hold_their_frame() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(6);
    t.ensure(e, "hero", "walk");
    assert!(t.set_playing(e, false));
    t.update(0.35, lookup(&def));
    assert_eq!(t.get(e).unwrap().frame_index, 0);
    assert!(!t.set_playing(EntityId(99), true));
}

#[test]
fn removal_discards_state_and_invalidates_handle() {
    let mut t = AnimationTracker::new();
    let a = EntityId(7);
    let h = t.ensure(a, "hero", "walk");
    assert!(t.remove(a).is_some());
    assert!(t.get(a).is_none());
    assert!(t.state(h).is_none());
    assert!(t.is_empty());

    // The freed slot is reused without resurrecting the stale handle.
    let b = EntityId(8);
    let hb = t.ensure(b, "hero", "idle");
    assert_ne!(h, hb);
    assert!(t.state(h).is_none());
    assert_eq!(t.state(hb).unwrap().animation, "idle");
}

#[test]
fn sheet_frame_offsets_by_sequence_start() {
    let def = walk_def();
    let mut t = AnimationTracker::new();
    let e = EntityId(9);
    t.ensure(e, "hero", "walk");
    t.update(0.35, lookup(&def));
    let walk = def.get("walk").unwrap();
    assert_eq!(t.sheet_frame(e, walk), Some(4 + 3));
    assert_eq!(t.sheet_frame(EntityId(10), walk), None);
}

#[test]
fn animation_table_parses_from_json() {
    let def = AnimationDef::from_json(
        r#"{ "walk": { "start_frame": 0, "frame_count": 4, "fps": 10 },
             "idle": { "start_frame": 4, "frame_count": 1 } }"#,
    )
    .unwrap();
    assert_eq!(def.get("idle").unwrap().fps, 0.0);
    assert_eq!(def.names().collect::<Vec<_>>(), vec!["idle", "walk"]);
    assert!(AnimationDef::from_json(r#"{ "x": { "start_frame": 0, "frame_count": 0 } }"#).is_err());
}

#[test]
fn huge_frame_rates_advance_in_constant_time() {
    let def = AnimationDef::new().with(
        "blur",
        AnimationSequence {
            start_frame: 0,
            frame_count: 7,
            fps: 1e12,
        },
    );
    let mut t = AnimationTracker::new();
    let e = EntityId(11);
    t.ensure(e, "hero", "blur");

    let started = std::time::Instant::now();
    t.update(1.0, lookup(&def));
    assert!(started.elapsed() < std::time::Duration::from_secs(1));

    let s = t.get(e).unwrap();
    assert!(s.frame_index < 7);
    assert!(s.elapsed >= 0.0 && s.elapsed < 1.0);
}

#[test]
fn long_stall_wraps_an_exact_number_of_times() {
    let def = AnimationDef::new().with(
        "spin",
        AnimationSequence {
            start_frame: 0,
            frame_count: 4,
            fps: 8.0,
        },
    );
    let mut t = AnimationTracker::new();
    let e = EntityId(12);
    t.ensure(e, "hero", "spin");

    // 1000.5 s at 8 fps is 8004 periods: 2001 full wraps, landing on frame 0.
    t.update(1_000.5, lookup(&def));
    let s = t.get(e).unwrap();
    assert_eq!(s.frame_index, 0);
    assert!(s.elapsed.abs() < 1e-9);

    // A further 3.5 periods lands three frames on with half a period pending.
    t.update(3.5 / 8.0, lookup(&def));
    let s = t.get(e).unwrap();
    assert_eq!(s.frame_index, 3);
    assert!((s.elapsed - 0.0625).abs() < 1e-9);
}
