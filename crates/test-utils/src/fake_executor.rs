use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sitepipe::dag::ScheduledTask;
use sitepipe::engine::{RuntimeEvent, TaskOutcome};
use sitepipe::errors::Result;
use sitepipe::exec::ExecutorBackend;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which tasks were "run", with their run ids
/// - immediately reports `TaskProgressed` for long-lived tasks
/// - reports `TaskCompleted` for one-shot tasks: `Failed` for names in the
///   failing set, `Success` otherwise.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<(String, u64)>>>,
    failing: HashSet<String>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            executed: Arc::new(Mutex::new(Vec::new())),
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }

    /// Shared log of `(task, run_id)` in dispatch order.
    pub fn executed(&self) -> Arc<Mutex<Vec<(String, u64)>>> {
        Arc::clone(&self.executed)
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failing = self.failing.clone();

        Box::pin(async move {
            for t in tasks {
                executed.lock().unwrap().push((t.name.clone(), t.run_id));

                let event = if t.long_lived {
                    RuntimeEvent::TaskProgressed { task: t.name.clone() }
                } else if failing.contains(&t.name) {
                    RuntimeEvent::TaskCompleted {
                        task: t.name.clone(),
                        outcome: TaskOutcome::Failed(format!("{} failed (fake)", t.name)),
                    }
                } else {
                    RuntimeEvent::TaskCompleted {
                        task: t.name.clone(),
                        outcome: TaskOutcome::Success,
                    }
                };

                tx.send(event).await.map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
