// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SitepipeError};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| SitepipeError::ConfigError(format!("reading config file {:?}: {e}", path)))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// - An explicitly passed path must exist.
/// - The implicit default (`Sitepipe.toml` in `search_dir`) is optional:
///   when it is absent the built-in defaults are used.
pub fn load_or_default(explicit: Option<&Path>, search_dir: &Path) -> Result<ConfigFile> {
    match explicit {
        Some(path) => load_and_validate(path),
        None => {
            let path = default_config_path(search_dir);
            if path.is_file() {
                load_and_validate(&path)
            } else {
                debug!(?path, "no config file found; using built-in defaults");
                Ok(ConfigFile::default())
            }
        }
    }
}

pub const DEFAULT_CONFIG_FILE: &str = "Sitepipe.toml";

/// Default config path: `Sitepipe.toml` in `dir`.
pub fn default_config_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILE)
}
