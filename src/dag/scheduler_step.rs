// src/dag/scheduler_step.rs

use crate::dag::task_info::ScheduledTask;
use crate::engine::TaskName;

/// What changed when the scheduler handled one event.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Dispatch these now.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// The failing task first, then the dependents it took down.
    pub newly_failed: Vec<TaskName>,
    /// The run ended with this step.
    pub run_just_finished: bool,
}

impl SchedulerStep {
    pub fn empty() -> Self {
        Self::default()
    }
}
