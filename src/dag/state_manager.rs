// src/dag/state_manager.rs

//! Per-run state table for the scheduler.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::dag::DagGraph;
use crate::engine::TaskName;

/// All tasks of the graph with their per-run and historical state.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: HashMap<TaskName, TaskInfo>,
}

impl TaskTable {
    pub fn insert(&mut self, info: TaskInfo) {
        self.tasks.insert(info.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&TaskInfo> {
        self.tasks.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TaskInfo> {
        self.tasks.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn values(&self) -> impl Iterator<Item = &TaskInfo> {
        self.tasks.values()
    }

    /// Forget per-run state; history (`last_*_run`) is kept.
    pub fn reset_run_state(&mut self) {
        for info in self.tasks.values_mut() {
            info.run_state = None;
        }
    }

    /// Put `root` and everything downstream of it into the current run.
    ///
    /// Tasks already in the run keep their state.
    pub fn include_with_dependents(&mut self, graph: &DagGraph, root: &str) {
        let mut stack: Vec<&str> = vec![root];
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }

            match self.tasks.get_mut(name) {
                Some(info) => {
                    if info.run_state.is_none() {
                        info.run_state = Some(RunState::Pending);
                        debug!(task = %info.name, "marked Pending for this run");
                    }
                    stack.extend(graph.dependents_of(name).iter().map(String::as_str));
                }
                None => warn!(task = %name, "node in DAG not present in task table"),
            }
        }
    }

    /// Whether every dependency of `info` is satisfied for the current run.
    ///
    /// A dependency in the run must be `DoneSuccess`; a dependency outside
    /// the run counts if it ever succeeded.
    pub fn deps_satisfied(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| match self.tasks.get(dep_name) {
            Some(dep) => match dep.run_state {
                Some(RunState::DoneSuccess) => true,
                Some(_) => false,
                None => dep.last_successful_run.is_some(),
            },
            None => {
                warn!(task = %info.name, dep = %dep_name, "dependency missing from task table");
                false
            }
        })
    }

    /// Mark every in-run dependent of `failed_task` (transitively) as
    /// `DoneFailed`, returning their names. The failed task itself is not
    /// included.
    pub fn fail_dependents(&mut self, graph: &DagGraph, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = graph.dependents_of(failed_task).to_vec();
        let mut newly_failed = Vec::new();

        while let Some(name) = stack.pop() {
            let Some(info) = self.tasks.get_mut(&name) else {
                continue;
            };
            if matches!(info.run_state, Some(RunState::Pending | RunState::Running)) {
                info.run_state = Some(RunState::DoneFailed);
                debug!(task = %info.name, "upstream failure; marking DoneFailed");
                newly_failed.push(name.clone());
                stack.extend(graph.dependents_of(&name).iter().cloned());
            }
        }

        newly_failed
    }

    /// Move every `Pending` task whose dependencies are satisfied to
    /// `Running` and hand them out for dispatch.
    pub fn take_ready(&mut self, run_id: u64) -> Vec<ScheduledTask> {
        let mut ready: Vec<TaskName> = self
            .tasks
            .values()
            .filter(|info| info.run_state == Some(RunState::Pending) && self.deps_satisfied(info))
            .map(|info| info.name.clone())
            .collect();
        // Stable dispatch order for logs and tests.
        ready.sort();

        ready
            .into_iter()
            .filter_map(|name| {
                let info = self.tasks.get_mut(&name)?;
                let first_run = info.last_successful_run.is_none() && info.last_failed_run.is_none();
                info!(
                    task = %info.name,
                    run_id,
                    first_run,
                    long_lived = info.long_lived,
                    "dependencies satisfied; dispatching task"
                );
                info.run_state = Some(RunState::Running);
                Some(ScheduledTask::from_task_info(info, run_id))
            })
            .collect()
    }

    /// No task is `Pending` or `Running`.
    pub fn all_terminal(&self) -> bool {
        !self
            .tasks
            .values()
            .any(|info| matches!(info.run_state, Some(RunState::Pending | RunState::Running)))
    }
}
