//! Configuration loading and settings types

pub mod loader;
pub mod settings;
