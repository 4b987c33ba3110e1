//! Configuration management for pulse
//!
//! This crate holds the settings consumed by the bus and the normalizer and
//! the loader that layers a JSON file and environment overrides on top of
//! the built-in defaults.

pub mod config;
pub mod loader;


pub use config::*;
