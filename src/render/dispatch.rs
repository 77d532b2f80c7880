use crate::foundation::core::Canvas;
use crate::render::command::DrawCommand;
use crate::render::depth::{DepthKey, ENTITY_BIAS};
use crate::render::diagnostics::SkippedCommand;
use crate::transform::iso::{Camera, IsoProjection, TilePos};

/// Where a command is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Rasterized into the scene band.
    World,
    /// Handed to the viewport compositor.
    Viewport,
    /// Painted over the composited output.
    Overlay,
}

/// Sort key with submission order as the tie-break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    depth: DepthKey,
    submission: usize,
}

/// Execution order for one frame.
#[derive(Clone, Debug, Default)]
pub struct DispatchPlan {
    /// Every drawable command index, in paint order.
    pub order: Vec<usize>,
    pub world: Vec<usize>,
    pub viewports: Vec<usize>,
    pub overlay: Vec<usize>,
    pub skipped: Vec<SkippedCommand>,
}

pub fn route(cmd: &DrawCommand) -> Option<Route> {
    match cmd {
        DrawCommand::IsoTile(_)
        | DrawCommand::IsoEntity(_)
        | DrawCommand::FlatRect(_)
        | DrawCommand::FlatSprite(_) => Some(Route::World),
        DrawCommand::Viewport(_) => Some(Route::Viewport),
        DrawCommand::Ui(_) | DrawCommand::Primitive(_) => Some(Route::Overlay),
        DrawCommand::Unknown => None,
    }
}

/// Paint-order key of a command, or `None` for kinds that never draw.
pub fn depth_key(
    cmd: &DrawCommand,
    projection: &IsoProjection,
    camera: &Camera,
    screen: Canvas,
) -> Option<DepthKey> {
    let ground_y =
        |pos: TilePos| projection.tile_pos_to_screen(pos, 0.0, camera, screen).y;
    Some(match cmd {
        DrawCommand::IsoTile(t) => {
            DepthKey::iso_stacked(t.layer, ground_y(t.tile.into()), f64::from(t.height))
        }
        DrawCommand::IsoEntity(e) => {
            DepthKey::iso_stacked(e.layer, ground_y(e.position()) + ENTITY_BIAS, e.height)
        }
        DrawCommand::Ui(u) => DepthKey::ui(u.z),
        DrawCommand::Primitive(p) => DepthKey::ui(p.z),
        DrawCommand::FlatRect(r) => DepthKey::flat(r.z),
        DrawCommand::FlatSprite(s) => DepthKey::flat(s.z),
        DrawCommand::Viewport(v) => DepthKey::viewport(v.layer),
        DrawCommand::Unknown => return None,
    })
}

/// Validate, key and route every command, then order each route by depth key.
///
/// The sort is stable: commands with equal keys keep their submission order.
pub fn plan_dispatch(
    commands: &[DrawCommand],
    projection: &IsoProjection,
    camera: &Camera,
    screen: Canvas,
) -> DispatchPlan {
    let mut plan = DispatchPlan::default();
    let mut keyed: Vec<(OrderKey, Route)> = Vec::with_capacity(commands.len());

    for (i, cmd) in commands.iter().enumerate() {
        if let Some(reason) = cmd.defect() {
            tracing::warn!(index = i, kind = cmd.kind(), reason, "draw command skipped");
            plan.skipped.push(SkippedCommand {
                index: i,
                reason: reason.to_owned(),
            });
            continue;
        }
        let (Some(depth), Some(route)) = (depth_key(cmd, projection, camera, screen), route(cmd))
        else {
            continue;
        };
        keyed.push((
            OrderKey {
                depth,
                submission: i,
            },
            route,
        ));
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, route) in keyed {
        plan.order.push(key.submission);
        match route {
            Route::World => plan.world.push(key.submission),
            Route::Viewport => plan.viewports.push(key.submission),
            Route::Overlay => plan.overlay.push(key.submission),
        }
    }
    plan
}

/// Drawable command indices in paint order.
pub fn sort_commands(
    commands: &[DrawCommand],
    camera: &Camera,
    projection: &IsoProjection,
    screen: Canvas,
) -> Vec<usize> {
    plan_dispatch(commands, projection, camera, screen).order
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispatch.rs"]
mod tests;
