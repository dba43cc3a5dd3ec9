pub mod commands;
pub mod config;
pub mod settings;
pub mod store;
