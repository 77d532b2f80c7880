pub(crate) mod config;
pub(crate) mod content;
pub(crate) mod effects;
