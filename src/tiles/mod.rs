pub(crate) mod grid;
pub(crate) mod stagger;
