// src/engine/event_handlers.rs

//! Per-event rules of the core runtime, kept as free functions over the
//! scheduler and trigger queue.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::dag::{ScheduledTask, Scheduler, TaskRunState};
use crate::engine::queue::TriggerQueue;
use crate::engine::{TaskName, TaskOutcome, TriggerReason};

#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    DispatchTasks(Vec<ScheduledTask>),
    /// End the process. A non-empty `failed` list means exit code 1.
    RequestExit { failed: Vec<TaskName> },
}

/// Commands for one event, plus whether the event loop continues.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn dispatch(tasks: Vec<ScheduledTask>) -> Self {
        let mut step = Self::running(Vec::new());
        step.push_dispatch(tasks);
        step
    }

    fn push_dispatch(&mut self, tasks: Vec<ScheduledTask>) {
        if !tasks.is_empty() {
            self.commands.push(CoreCommand::DispatchTasks(tasks));
        }
    }
}

/// A trigger while idle starts a run together with whatever was queued.
/// During a run, a task outside the run joins it and a task already in it
/// waits in the queue.
pub fn handle_task_trigger(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    debug!(task = %task, ?reason, "trigger received");

    if scheduler.is_idle() {
        let mut roots: BTreeSet<TaskName> = queue.take_next().into_iter().collect();
        roots.insert(task);
        return CoreStep::dispatch(start_run(scheduler, roots));
    }

    match scheduler.run_state_of(&task) {
        None => {
            warn!(task = %task, "trigger for unknown task ignored");
            CoreStep::running(Vec::new())
        }
        Some(TaskRunState::NotInRun) => CoreStep::dispatch(scheduler.handle_trigger(&task)),
        Some(state) => {
            debug!(task = %task, ?state, "task already in run; queued");
            queue.record_trigger(&task);
            CoreStep::running(Vec::new())
        }
    }
}

pub fn handle_task_progress(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    task: TaskName,
) -> CoreStep {
    let mut step = CoreStep::dispatch(scheduler.handle_progress(&task));
    step.push_dispatch(drain_queue_if_idle(scheduler, queue));
    step
}

/// Records the completed task and every dependent it failed in `failures`.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    failures: &mut Vec<TaskName>,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    let result = scheduler.step_completion(&task, outcome);
    failures.extend(result.newly_failed);

    let mut step = CoreStep::dispatch(result.newly_scheduled);
    step.push_dispatch(drain_queue_if_idle(scheduler, queue));
    step
}

fn start_run(scheduler: &mut Scheduler, roots: BTreeSet<TaskName>) -> Vec<ScheduledTask> {
    if roots.is_empty() {
        return Vec::new();
    }
    scheduler.start_new_run();
    roots
        .iter()
        .flat_map(|root| scheduler.handle_trigger(root))
        .collect()
}

fn drain_queue_if_idle(scheduler: &mut Scheduler, queue: &mut TriggerQueue) -> Vec<ScheduledTask> {
    if !scheduler.is_idle() || queue.is_empty() {
        return Vec::new();
    }
    start_run(scheduler, queue.take_next().into_iter().collect())
}
