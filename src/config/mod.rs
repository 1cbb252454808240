// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate basic invariants like directory sanity (`validate.rs`).
//! - Derive the project filesystem layout (`layout.rs`).

pub mod layout;
pub mod loader;
pub mod model;
pub mod validate;

pub use layout::Layout;
pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, ConfigSection, IncludeSection, PathsSection, RawConfigFile, ServerSection,
    WatchSection,
};
