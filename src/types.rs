// src/types.rs

//! Small enums shared by the config model and the engine.

use serde::Deserialize;

/// What to do with a watch trigger for a task that is already part of the
/// active run. The running task is never interrupted either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    /// Collect the trigger into the next run.
    #[default]
    Queue,
    /// Throw away whatever is queued and keep only this trigger.
    Cancel,
}

/// Where the watcher keeps per-binding content hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashStorageMode {
    /// `.sitepipe/hashes` under the project root; survives restarts.
    File,
    #[default]
    Memory,
}
