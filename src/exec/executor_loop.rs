// src/exec/executor_loop.rs

//! Main executor loop that manages running task instances.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::run_task;
use crate::tasks::TaskContext;

/// Handle for a task instance the executor started.
///
/// Dropping `_cancel` stops a long-lived instance.
struct ActiveTask {
    _cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Spawn the background executor loop.
///
/// The returned sender is what `RealExecutorBackend` forwards scheduled
/// tasks to. Per task name there is never more than one instance running:
///
/// - A long-lived task that is already running is not restarted; its
///   readiness is reported again with a synthesized `TaskProgressed`.
/// - A one-shot task still finishing from an earlier run is waited for
///   before the new instance starts.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: Arc<TaskContext>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        // At most one ActiveTask per task name.
        let mut active: HashMap<String, ActiveTask> = HashMap::new();

        while let Some(task) = rx.recv().await {
            handle_scheduled_task(task, &mut active, &runtime_tx, &ctx).await;
        }

        // Dropping `active` cancels every long-lived instance.
        info!("executor loop finished (channel closed)");
    });

    tx
}

async fn handle_scheduled_task(
    task: ScheduledTask,
    active: &mut HashMap<String, ActiveTask>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    ctx: &Arc<TaskContext>,
) {
    let name = task.name.clone();

    let previous = match active.remove(&name) {
        Some(existing) if !existing.handle.is_finished() => {
            if task.long_lived {
                debug!(
                    task = %name,
                    run_id = task.run_id,
                    "long-lived task already running; synthesizing progress event"
                );
                active.insert(name.clone(), existing);
                let _ = runtime_tx
                    .send(RuntimeEvent::TaskProgressed { task: name })
                    .await;
                return;
            }
            debug!(
                task = %name,
                run_id = task.run_id,
                "previous instance still finishing; new instance will wait for it"
            );
            Some(existing.handle)
        }
        _ => None,
    };

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let rt_tx = runtime_tx.clone();
    let ctx = Arc::clone(ctx);
    let spawn_name = name.clone();

    let handle = tokio::spawn(async move {
        if let Some(previous) = previous {
            let _ = previous.await;
        }
        run_task(task, ctx, rt_tx, cancel_rx).await;
        debug!(task = %spawn_name, "task runner future finished");
    });

    active.insert(
        name,
        ActiveTask {
            _cancel: cancel_tx,
            handle,
        },
    );
}
