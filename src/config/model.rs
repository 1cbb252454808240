// src/config/model.rs

use serde::Deserialize;

use crate::types::{HashStorageMode, TriggerWhileRunningBehaviour};

/// Top-level configuration as read from `Sitepipe.toml`.
///
/// ```toml
/// [config]
/// triggered_while_running_behaviour = "queue"
/// queue_length = 1
///
/// [paths]
/// app = "app"
/// release = "docs"
///
/// [server]
/// port = 3000
/// ```
///
/// All sections are optional and have defaults matching the standard
/// `app/` + `docs/` layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub include: IncludeSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`) or [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub paths: PathsSection,
    pub include: IncludeSection,
    pub server: ServerSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            paths: raw.paths,
            include: raw.include,
            server: raw.server,
            watch: raw.watch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[config]` section: engine behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// `"queue"` (default) or `"cancel"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued trigger batches to remember.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Where watch binding hashes are kept when `[watch].use_hash = true`.
    #[serde(default)]
    pub hash_storage_mode: HashStorageMode,
}

fn default_queue_length() -> usize {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: default_queue_length(),
            hash_storage_mode: HashStorageMode::default(),
        }
    }
}

/// `[paths]` section, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Source + development output directory.
    #[serde(default = "default_app_dir")]
    pub app: String,

    /// Release output directory, wiped by `cleanDist`.
    #[serde(default = "default_release_dir")]
    pub release: String,
}

fn default_app_dir() -> String {
    "app".to_string()
}

fn default_release_dir() -> String {
    "docs".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            app: default_app_dir(),
            release: default_release_dir(),
        }
    }
}

/// `[include]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludeSection {
    /// Marker prefix for directives and variables (`@@include`, `@@title`).
    #[serde(default = "default_include_prefix")]
    pub prefix: String,
}

fn default_include_prefix() -> String {
    "@@".to_string()
}

impl Default for IncludeSection {
    fn default() -> Self {
        Self {
            prefix: default_include_prefix(),
        }
    }
}

/// `[server]` section for the `browsersync` task.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// `0` picks a free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    /// Only trigger a binding when the content of its files actually changed.
    #[serde(default)]
    pub use_hash: bool,
}
