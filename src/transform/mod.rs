pub(crate) mod iso;
pub(crate) mod pick;
