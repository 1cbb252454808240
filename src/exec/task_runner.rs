// src/exec/task_runner.rs

//! Runs one scheduled task instance and reports back to the runtime.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::{Result, SitepipeError};
use crate::pipeline::TaskKind;
use crate::server::DevServer;
use crate::tasks::{self, TaskContext};
use crate::watch::spawn_watcher;

/// Run a task instance to its end.
///
/// - One-shot tasks run on the blocking pool and send exactly one
///   `TaskCompleted`.
/// - Long-lived tasks send `TaskProgressed` once ready, then keep running
///   until `cancel_rx` fires (or its sender is dropped). A failure, before
///   or after readiness, is sent as `TaskCompleted`; cancellation sends
///   nothing.
pub async fn run_task(
    task: ScheduledTask,
    ctx: Arc<TaskContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    cancel_rx: oneshot::Receiver<()>,
) {
    info!(task = %task.name, run_id = task.run_id, "starting task");

    let result = match task.kind {
        TaskKind::BrowserSync => run_browsersync(&task, &ctx, &runtime_tx, cancel_rx).await,
        TaskKind::Watching => run_watching(&task, &ctx, &runtime_tx, cancel_rx).await,
        kind => run_blocking(kind, Arc::clone(&ctx)).await.map(Some),
    };

    let outcome = match result {
        // Cancelled long-lived instance.
        Ok(None) => return,
        Ok(Some(())) => {
            info!(task = %task.name, run_id = task.run_id, "task finished");
            TaskOutcome::Success
        }
        Err(err) => {
            error!(task = %task.name, run_id = task.run_id, error = %err, "task failed");
            TaskOutcome::Failed(err.to_string())
        }
    };

    let _ = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name,
            outcome,
        })
        .await;
}

async fn run_blocking(kind: TaskKind, ctx: Arc<TaskContext>) -> Result<()> {
    tokio::task::spawn_blocking(move || tasks::run_one_shot(kind, &ctx))
        .await
        .map_err(|e| SitepipeError::Other(anyhow::anyhow!("{kind} task panicked: {e}")))?
}

/// `browsersync`: bind, report readiness, serve until cancelled.
async fn run_browsersync(
    task: &ScheduledTask,
    ctx: &TaskContext,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    cancel_rx: oneshot::Receiver<()>,
) -> Result<Option<()>> {
    let server = DevServer::bind(&ctx.config.server, ctx.layout.app_dir(), ctx.reload.clone()).await?;
    info!(task = %task.name, addr = %server.local_addr()?, "dev server bound");
    report_progress(task, runtime_tx).await;

    tokio::select! {
        served = server.serve() => served.map(Some),
        _ = cancel_rx => {
            info!(task = %task.name, "dev server stopping");
            Ok(None)
        }
    }
}

/// `watching`: register the bindings, report readiness, hold the watcher
/// until cancelled.
async fn run_watching(
    task: &ScheduledTask,
    ctx: &TaskContext,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    cancel_rx: oneshot::Receiver<()>,
) -> Result<Option<()>> {
    let watcher = spawn_watcher(ctx, runtime_tx.clone())?;
    report_progress(task, runtime_tx).await;

    let _ = cancel_rx.await;
    info!(task = %task.name, root = ?watcher.root(), "file watcher stopping");
    drop(watcher);
    Ok(None)
}

async fn report_progress(task: &ScheduledTask, runtime_tx: &mpsc::Sender<RuntimeEvent>) {
    let _ = runtime_tx
        .send(RuntimeEvent::TaskProgressed {
            task: task.name.clone(),
        })
        .await;
}
