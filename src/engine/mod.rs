// src/engine/mod.rs

//! Run orchestration.
//!
//! [`core::CoreRuntime`] owns the scheduler and the trigger queue and turns
//! each [`RuntimeEvent`] into [`CoreCommand`]s without doing any IO.
//! [`runtime::Runtime`] is the async loop around it: it pulls events off a
//! channel and hands dispatched tasks to an executor backend.
//!
//! Events come from three places: the invoked target (initial roots), the
//! watcher (file changes) and the executor (progress and completion).

pub type TaskName = String;

/// How a task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Carries the error message of the failed operation.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Root of the target given on the command line.
    Manual,
    /// A watch binding matched a changed file.
    FileWatch,
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Stop as soon as no run is active and nothing is queued. Set for
    /// targets without a long-lived root.
    pub exit_when_idle: bool,
}

#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A long-lived task became ready: the server is listening or the
    /// watcher has registered its bindings.
    TaskProgressed {
        task: TaskName,
    },
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Ctrl-C.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
