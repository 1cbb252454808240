use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::TaskTable;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{TaskName, TaskOutcome};
use crate::pipeline::Pipeline;

/// Scheduler holds the immutable DAG plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - deciding when a triggered task is ready to run (deps satisfied)
/// - marking tasks as succeeded/failed/progressed
/// - failing dependents when a task fails
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: TaskTable,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    /// Construct a scheduler from a validated [`Pipeline`].
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        let graph = DagGraph::from_pipeline(pipeline);
        let mut tasks = TaskTable::default();

        for (name, spec) in pipeline.tasks().iter() {
            let deps = graph.dependencies_of(name).to_vec();
            tasks.insert(TaskInfo::from_spec(name.clone(), spec, deps));
        }

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// Current run ID, if any.
    pub fn current_run_id(&self) -> Option<u64> {
        self.current_run_id
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks.get(task).map(|info| info.run_state.into())
    }

    /// Names of tasks participating in the *active* run (empty when idle).
    pub fn tasks_in_current_run(&self) -> Vec<TaskName> {
        if self.current_run_id.is_none() {
            return Vec::new();
        }

        self.tasks
            .values()
            .filter(|info| info.run_state.is_some())
            .map(|info| info.name.clone())
            .collect()
    }

    /// Whether the dependencies of `task` are satisfied for the current run.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        Some(self.tasks.deps_satisfied(info))
    }

    /// Start a new run, resetting per-run state but keeping historical success
    /// information (for dependency satisfaction on later runs).
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);
        self.tasks.reset_run_state();

        debug!(run_id = self.run_counter, "scheduler: starting new DAG run");
    }

    /// Handle a trigger for a task name.
    pub fn handle_trigger(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.step_trigger(task).newly_scheduled
    }

    /// Handle "progress" from a long-lived task.
    pub fn handle_progress(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.step_progress(task).newly_scheduled
    }

    /// Handle completion of a task with a concrete outcome.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Trigger `task` (and everything downstream) in the current run,
    /// implicitly starting a run when idle.
    pub fn step_trigger(&mut self, task: &str) -> SchedulerStep {
        if self.current_run_id.is_none() {
            debug!(task = %task, "trigger with no active run; implicitly starting a new run");
            self.start_new_run();
        }

        if self.tasks.contains(task) {
            self.tasks.include_with_dependents(&self.graph, task);
        } else {
            warn!(task = %task, "trigger for unknown task; ignoring");
        }

        self.finish_step(Vec::new())
    }

    /// A long-lived task is ready: it counts as done for this run while it
    /// keeps running.
    pub fn step_progress(&mut self, task: &str) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            debug!(task = %task, "progress with no active run; ignoring");
            return SchedulerStep::empty();
        };

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "progress from unknown task; ignoring");
            return SchedulerStep::empty();
        };

        if info.run_state != Some(RunState::Running) {
            debug!(task = %task, run_id, state = ?info.run_state, "progress for task not running in this run; ignoring");
            return SchedulerStep::empty();
        }

        debug!(task = %info.name, run_id, "task reported progress; marking DoneSuccess");
        info.run_state = Some(RunState::DoneSuccess);
        info.last_successful_run = Some(run_id);

        self.finish_step(Vec::new())
    }

    /// Record the outcome of a task. Failures propagate to every in-run
    /// dependent.
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::empty();
        };

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            return SchedulerStep::empty();
        };

        // A long-lived task that already progressed (or a task from an older
        // run) no longer takes part in scheduling decisions.
        if info.run_state != Some(RunState::Running) {
            warn!(task = %task, run_id, state = ?info.run_state, ?outcome, "completion for task not running in this run; ignoring");
            return SchedulerStep::empty();
        }

        let mut newly_failed = Vec::new();

        match outcome {
            TaskOutcome::Success => {
                info.run_state = Some(RunState::DoneSuccess);
                info.last_successful_run = Some(run_id);
                debug!(task = %task, run_id, "task completed successfully");
            }
            TaskOutcome::Failed(reason) => {
                info.run_state = Some(RunState::DoneFailed);
                info.last_failed_run = Some(run_id);
                warn!(task = %task, run_id, %reason, "task failed; failing dependents in this run");
                newly_failed.push(task.to_string());
                newly_failed.extend(self.tasks.fail_dependents(&self.graph, task));
            }
        }

        self.finish_step(newly_failed)
    }

    /// Whether `task` is a long-lived task (unknown tasks are not).
    pub fn is_long_lived(&self, task: &str) -> bool {
        self.tasks.get(task).is_some_and(|info| info.long_lived)
    }

    /// Task names in the graph.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    /// Dispatch newly ready tasks, then close the run if nothing is left.
    fn finish_step(&mut self, newly_failed: Vec<TaskName>) -> SchedulerStep {
        let run_id = self.current_run_id.unwrap_or(0);
        let newly_scheduled = self.tasks.take_ready(run_id);

        let run_just_finished = self.current_run_id.is_some() && self.tasks.all_terminal();
        if run_just_finished {
            info!(run_id, "scheduler: all tasks terminal; run finished");
            self.current_run_id = None;
        }

        SchedulerStep {
            newly_scheduled,
            newly_failed,
            run_just_finished,
        }
    }
}
