//! Configuration management for session authentication
//!
//! This module handles loading and managing configuration settings for the
//! library and the `mubi-auth` binary.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{DisplayMode, Settings};
