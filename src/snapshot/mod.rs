pub(crate) mod cache;
pub(crate) mod capture;
pub(crate) mod debounce;
