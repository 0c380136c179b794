pub(crate) mod ease;
pub(crate) mod script;
pub(crate) mod tier;
pub(crate) mod timeline;
