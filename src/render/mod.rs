pub(crate) mod command;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod depth;
pub(crate) mod diagnostics;
pub(crate) mod dispatch;
pub(crate) mod layers;
pub(crate) mod paint;
pub(crate) mod renderer;
pub(crate) mod surface;
pub(crate) mod surface_pool;
