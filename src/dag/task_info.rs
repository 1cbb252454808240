// src/dag/task_info.rs

//! Per-task records kept by the scheduler.

use crate::engine::TaskName;
use crate::pipeline::{TaskKind, TaskSpec};

/// Where a task stands within the active run (internal).
///
/// `None` in [`TaskInfo::run_state`] means the task is not part of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting for dependencies.
    Pending,
    /// Handed to the executor.
    Running,
    /// Finished successfully, or a long-lived task reported readiness.
    DoneSuccess,
    /// Failed itself, or an upstream task failed.
    DoneFailed,
}

/// Read-only run state for callers outside the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    NotInRun,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

impl From<Option<RunState>> for TaskRunState {
    fn from(state: Option<RunState>) -> Self {
        let Some(state) = state else {
            return TaskRunState::NotInRun;
        };
        match state {
            RunState::Pending => TaskRunState::Pending,
            RunState::Running => TaskRunState::Running,
            RunState::DoneSuccess => TaskRunState::DoneSuccess,
            RunState::DoneFailed => TaskRunState::DoneFailed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    pub kind: TaskKind,
    /// Copied from the kind so scheduling never has to look it up.
    pub long_lived: bool,
    /// Names this task runs after.
    pub deps: Vec<TaskName>,
    pub run_state: Option<RunState>,
    /// Run id of the most recent success; satisfies dependents in later
    /// runs that do not include this task.
    pub last_successful_run: Option<u64>,
    pub last_failed_run: Option<u64>,
}

impl TaskInfo {
    pub fn from_spec(name: TaskName, spec: &TaskSpec, deps: Vec<TaskName>) -> Self {
        Self {
            name,
            kind: spec.kind,
            long_lived: spec.kind.long_lived(),
            deps,
            run_state: None,
            last_successful_run: None,
            last_failed_run: None,
        }
    }
}

/// A task the scheduler released for execution in run `run_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub kind: TaskKind,
    pub long_lived: bool,
    pub run_id: u64,
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo, run_id: u64) -> Self {
        Self {
            name: info.name.clone(),
            kind: info.kind,
            long_lived: info.long_lived,
            run_id,
        }
    }
}
