// src/engine/runtime.rs

use std::fmt;
use std::ops::ControlFlow;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{Result, SitepipeError};
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Event loop that feeds [`CoreRuntime`] and carries out its commands.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Run until the core asks to exit or every event sender is gone.
    ///
    /// An exit with failed tasks becomes [`SitepipeError::TasksFailed`].
    pub async fn run(mut self) -> Result<()> {
        info!("runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "event");
            let step = self.core.step(event);

            for command in step.commands {
                if let ControlFlow::Break(result) = self.execute(command).await {
                    return result;
                }
            }
            if !step.keep_running {
                return Ok(());
            }
        }

        info!("event channel closed");
        Ok(())
    }

    async fn execute(&mut self, command: CoreCommand) -> ControlFlow<Result<()>> {
        match command {
            CoreCommand::DispatchTasks(tasks) if tasks.is_empty() => ControlFlow::Continue(()),
            CoreCommand::DispatchTasks(tasks) => {
                for task in &tasks {
                    debug!(task = %task.name, run_id = task.run_id, "dispatching");
                }
                match self.executor.spawn_ready_tasks(tasks).await {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(err) => ControlFlow::Break(Err(err)),
                }
            }
            CoreCommand::RequestExit { failed } if failed.is_empty() => {
                info!("finished");
                ControlFlow::Break(Ok(()))
            }
            CoreCommand::RequestExit { failed } => {
                warn!(?failed, "finished with failed tasks");
                ControlFlow::Break(Err(SitepipeError::TasksFailed(failed)))
            }
        }
    }
}
