pub(crate) mod aggregate;
pub(crate) mod apply;
pub(crate) mod named;
pub(crate) mod ops;
