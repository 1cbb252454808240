// src/exec/backend.rs

//! Seam between the runtime and task execution.
//!
//! The runtime only ever calls [`ExecutorBackend::spawn_ready_tasks`].
//! Production uses [`RealExecutorBackend`], which feeds the executor loop;
//! the test-utils crate provides a fake that answers with events directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::tasks::TaskContext;

use super::executor_loop::spawn_executor;

pub trait ExecutorBackend: Send {
    /// Start `tasks`. Results come back later as `RuntimeEvent`s, not
    /// through the returned future, which only covers the hand-off.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Forwards scheduled tasks to the background loop started by
/// [`spawn_executor`].
#[derive(Debug)]
pub struct RealExecutorBackend {
    tx: mpsc::Sender<ScheduledTask>,
}

impl RealExecutorBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, ctx: Arc<TaskContext>) -> Self {
        Self {
            tx: spawn_executor(runtime_tx, ctx),
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }
}
