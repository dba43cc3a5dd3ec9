//! Per-point kernels and the frame-level batch driver.

pub mod batch;
pub mod frame;

pub(crate) mod motion;
pub(crate) mod ocean;
pub(crate) mod radial;
pub(crate) mod simple;
pub(crate) mod sweep;
pub(crate) mod wave;
