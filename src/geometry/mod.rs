pub(crate) mod flip;
