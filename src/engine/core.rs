// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces an updated state plus a
//! list of [`CoreCommand`]s for the IO shell (`engine::runtime::Runtime`).
//! It has no channels, no Tokio types, and performs no IO, so every
//! orchestration rule can be unit tested by feeding it events.

use crate::dag::Scheduler;
use crate::engine::event_handlers::{
    handle_task_completion, handle_task_progress, handle_task_trigger, CoreCommand, CoreStep,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName, TaskOutcome};
use crate::types::TriggerWhileRunningBehaviour;

#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    options: RuntimeOptions,
    /// Every task that failed since startup, in failure order.
    failures: Vec<TaskName>,
}

impl CoreRuntime {
    pub fn new(
        scheduler: Scheduler,
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            scheduler,
            queue: TriggerQueue::new(behaviour, queue_length),
            options,
            failures: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn failures(&self) -> &[TaskName] {
        &self.failures
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let mut step = match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.scheduler, &mut self.queue, task, reason)
            }
            RuntimeEvent::TaskProgressed { task } => {
                handle_task_progress(&mut self.scheduler, &mut self.queue, task)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => {
                let stopped_service = self.scheduler.is_long_lived(&task);
                let mut step = handle_task_completion(
                    &mut self.scheduler,
                    &mut self.queue,
                    &mut self.failures,
                    task.clone(),
                    outcome.clone(),
                );
                // A resident target lives as long as its long-lived tasks do.
                if stopped_service && !self.options.exit_when_idle {
                    if matches!(outcome, TaskOutcome::Failed(_)) && !self.failures.contains(&task) {
                        self.failures.push(task);
                    }
                    step.commands.push(CoreCommand::RequestExit {
                        failed: self.failures.clone(),
                    });
                    step.keep_running = false;
                }
                step
            }
            RuntimeEvent::ShutdownRequested => {
                // Interrupting a resident target is the normal way to stop it;
                // failures of watch-triggered tasks do not affect the exit code.
                let failed = if self.options.exit_when_idle {
                    self.failures.clone()
                } else {
                    Vec::new()
                };
                return CoreStep {
                    commands: vec![CoreCommand::RequestExit { failed }],
                    keep_running: false,
                };
            }
        };

        // One-shot targets end as soon as nothing is running or queued.
        if self.options.exit_when_idle && self.scheduler.is_idle() && self.queue.is_empty() {
            step.commands.push(CoreCommand::RequestExit {
                failed: self.failures.clone(),
            });
            step.keep_running = false;
        }

        step
    }
}
