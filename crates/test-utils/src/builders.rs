#![allow(dead_code)]

use sitepipe::config::{ConfigFile, RawConfigFile};
use sitepipe::pipeline::{Pipeline, RawPipeline, TaskKind, TaskSpec};
use sitepipe::types::TriggerWhileRunningBehaviour;

/// Builder for ad-hoc task graphs.
///
/// Task names are free-form; each one is bound to a [`TaskKind`] so that
/// long-lived behaviour follows the kind.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    raw: RawPipeline,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a one-shot task.
    pub fn task(self, name: &str, after: &[&str]) -> Self {
        self.kind(name, TaskKind::Styles, after)
    }

    /// Add a long-lived task.
    pub fn long_lived(self, name: &str, after: &[&str]) -> Self {
        self.kind(name, TaskKind::Watching, after)
    }

    pub fn kind(mut self, name: &str, kind: TaskKind, after: &[&str]) -> Self {
        let spec = after
            .iter()
            .fold(TaskSpec::new(kind), |spec, dep| spec.after(*dep));
        self.raw.task.insert(name.to_string(), spec);
        self
    }

    pub fn raw(self) -> RawPipeline {
        self.raw
    }

    pub fn build(self) -> Pipeline {
        Pipeline::try_from(self.raw).expect("Failed to build valid pipeline from builder")
    }
}

/// Builder for `ConfigFile` to simplify test setup.
#[derive(Debug, Default)]
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.config.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn queue_length(mut self, len: usize) -> Self {
        self.config.config.queue_length = len;
        self
    }

    pub fn paths(mut self, app: &str, release: &str) -> Self {
        self.config.paths.app = app.to_string();
        self.config.paths.release = release.to_string();
        self
    }

    pub fn include_prefix(mut self, prefix: &str) -> Self {
        self.config.include.prefix = prefix.to_string();
        self
    }

    pub fn server(mut self, host: &str, port: u16) -> Self {
        self.config.server.host = host.to_string();
        self.config.server.port = port;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
