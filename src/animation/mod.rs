pub(crate) mod sheet;
pub(crate) mod tracker;
