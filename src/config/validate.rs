// src/config/validate.rs

use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SitepipeError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SitepipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_paths(cfg)?;
    validate_include(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(SitepipeError::ConfigError(
            "[config].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    for (key, raw) in [("app", &cfg.paths.app), ("release", &cfg.paths.release)] {
        let escapes = Path::new(raw).components().any(|c| {
            matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir)
        });
        if escapes || raw.starts_with('/') || raw.starts_with('\\') {
            return Err(SitepipeError::ConfigError(format!(
                "[paths].{key} must be a relative path below the project root without `..` (got {raw:?})"
            )));
        }
    }

    let app = normalize(&cfg.paths.app);
    let release = normalize(&cfg.paths.release);

    if app.as_os_str().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[paths].app must not be empty".to_string(),
        ));
    }
    if release.as_os_str().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[paths].release must not be empty".to_string(),
        ));
    }
    if app.starts_with(&release) {
        return Err(SitepipeError::ConfigError(format!(
            "[paths].release ({}) must not contain [paths].app ({}); cleaning it would delete sources",
            cfg.paths.release, cfg.paths.app
        )));
    }
    Ok(())
}

fn validate_include(cfg: &RawConfigFile) -> Result<()> {
    let prefix = &cfg.include.prefix;
    if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
        return Err(SitepipeError::ConfigError(format!(
            "[include].prefix must be non-empty and contain no whitespace (got {prefix:?})"
        )));
    }
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.host.parse::<IpAddr>().is_err() {
        return Err(SitepipeError::ConfigError(format!(
            "[server].host must be an IP address (got {:?})",
            cfg.server.host
        )));
    }
    Ok(())
}

/// Lexically normalise a relative path: drop `.` components and trailing
/// separators so `./docs/` and `docs` compare equal.
fn normalize(raw: &str) -> PathBuf {
    Path::new(raw)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
