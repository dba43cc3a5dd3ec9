pub mod catalog;
pub mod dataset;
pub mod host;
pub mod lifecycle;
pub mod loader;
