// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitepipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown target: {0} (expected one of: styles, scripts, watching, browsersync, htmlInclude, build, default)")]
    UnknownTarget(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Include not found: {target:?} (included from {from:?})")]
    IncludeNotFound { target: PathBuf, from: PathBuf },

    #[error("Include cycle: {0:?} includes itself")]
    IncludeCycle(PathBuf),

    #[error("Invalid include directive in {file:?}: {message}")]
    IncludeSyntax { file: PathBuf, message: String },

    #[error("Style compilation failed for {file:?}: {message}")]
    StyleCompile { file: PathBuf, message: String },

    #[error("Script minification failed for {file:?}: {message}")]
    ScriptMinify { file: PathBuf, message: String },

    #[error("{} task(s) failed: {}", .0.len(), .0.join(", "))]
    TasksFailed(Vec<String>),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitepipeError>;
