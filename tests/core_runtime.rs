// tests/core_runtime.rs

mod common;

use sitepipe::dag::Scheduler;
use sitepipe::engine::{
    CoreCommand, CoreRuntime, CoreStep, RuntimeEvent, RuntimeOptions, TaskOutcome,
    TriggerReason, TriggerWhileRunningBehaviour,
};
use sitepipe::pipeline::Pipeline;

fn core(exit_when_idle: bool, behaviour: TriggerWhileRunningBehaviour) -> CoreRuntime {
    core_with_queue(exit_when_idle, behaviour, 1)
}

fn core_with_queue(
    exit_when_idle: bool,
    behaviour: TriggerWhileRunningBehaviour,
    queue_length: usize,
) -> CoreRuntime {
    let scheduler = Scheduler::from_pipeline(&Pipeline::standard().unwrap());
    CoreRuntime::new(scheduler, behaviour, queue_length, RuntimeOptions { exit_when_idle })
}

fn trigger(task: &str, reason: TriggerReason) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task: task.to_string(),
        reason,
    }
}

fn completed(task: &str, outcome: TaskOutcome) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task: task.to_string(),
        outcome,
    }
}

fn progressed(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskProgressed {
        task: task.to_string(),
    }
}

/// `(name, run_id)` of every dispatched task in the step.
fn dispatched(step: &CoreStep) -> Vec<(String, u64)> {
    step.commands
        .iter()
        .filter_map(|cmd| match cmd {
            CoreCommand::DispatchTasks(tasks) => Some(tasks),
            CoreCommand::RequestExit { .. } => None,
        })
        .flatten()
        .map(|t| (t.name.clone(), t.run_id))
        .collect()
}

fn exit_request(step: &CoreStep) -> Option<Vec<String>> {
    step.commands.iter().find_map(|cmd| match cmd {
        CoreCommand::RequestExit { failed } => Some(failed.clone()),
        CoreCommand::DispatchTasks(_) => None,
    })
}

#[test]
fn one_shot_target_exits_cleanly_once_idle() {
    common::init_tracing();
    let mut core = core(true, TriggerWhileRunningBehaviour::Queue);

    let step = core.step(trigger("styles", TriggerReason::Manual));
    assert_eq!(dispatched(&step), vec![("styles".to_string(), 1)]);
    assert!(step.keep_running);

    let step = core.step(completed("styles", TaskOutcome::Success));
    assert_eq!(exit_request(&step), Some(vec![]));
    assert!(!step.keep_running);
}

#[test]
fn one_shot_target_reports_failures_on_exit() {
    let mut core = core(true, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("cleanDist", TriggerReason::Manual));

    let step = core.step(completed("cleanDist", TaskOutcome::Failed("busy".into())));
    let mut failed = exit_request(&step).expect("exit requested");
    failed.sort();
    assert_eq!(failed, vec!["building", "cleanDist", "copyImages"]);
    assert!(!step.keep_running);
}

#[test]
fn trigger_during_run_is_queued_for_the_next_run() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("styles", TriggerReason::Manual));

    let step = core.step(trigger("styles", TriggerReason::FileWatch));
    assert!(dispatched(&step).is_empty());
    assert!(!core.queue_is_empty());

    let step = core.step(completed("styles", TaskOutcome::Success));
    assert_eq!(dispatched(&step), vec![("styles".to_string(), 2)]);
    assert!(exit_request(&step).is_none());
    assert!(core.queue_is_empty());
}

#[test]
fn repeated_triggers_coalesce_into_one_rerun() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("scripts", TriggerReason::Manual));
    for _ in 0..5 {
        core.step(trigger("scripts", TriggerReason::FileWatch));
    }

    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert_eq!(dispatched(&step), vec![("scripts".to_string(), 2)]);

    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert!(dispatched(&step).is_empty());
    assert!(core.is_idle());
}

#[test]
fn longer_queue_keeps_one_rerun_per_batch() {
    let mut core = core_with_queue(false, TriggerWhileRunningBehaviour::Queue, 2);
    core.step(trigger("scripts", TriggerReason::Manual));
    for _ in 0..4 {
        core.step(trigger("scripts", TriggerReason::FileWatch));
    }

    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert_eq!(dispatched(&step), vec![("scripts".to_string(), 2)]);
    assert!(!core.queue_is_empty());

    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert_eq!(dispatched(&step), vec![("scripts".to_string(), 3)]);
    assert!(core.queue_is_empty());

    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert!(dispatched(&step).is_empty());
    assert!(core.is_idle());
}

#[test]
fn independent_trigger_joins_the_active_run() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("styles", TriggerReason::FileWatch));

    let step = core.step(trigger("htmlInclude", TriggerReason::FileWatch));
    assert_eq!(dispatched(&step), vec![("htmlInclude".to_string(), 1)]);
}

#[test]
fn cancel_mode_keeps_only_the_latest_queued_trigger() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Cancel);
    core.step(trigger("styles", TriggerReason::Manual));
    core.step(trigger("scripts", TriggerReason::Manual));

    core.step(trigger("styles", TriggerReason::FileWatch));
    core.step(trigger("scripts", TriggerReason::FileWatch));

    core.step(completed("styles", TaskOutcome::Success));
    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert_eq!(dispatched(&step), vec![("scripts".to_string(), 2)]);
}

#[test]
fn resident_target_ignores_watch_failures_on_shutdown() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("watching", TriggerReason::Manual));
    core.step(progressed("watching"));

    core.step(trigger("styles", TriggerReason::FileWatch));
    let step = core.step(completed("styles", TaskOutcome::Failed("syntax".into())));
    assert!(step.keep_running, "a failed rebuild keeps the process up");
    assert_eq!(core.failures(), ["styles".to_string()]);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert_eq!(exit_request(&step), Some(vec![]));
    assert!(!step.keep_running);
}

#[test]
fn one_shot_target_keeps_failures_on_shutdown() {
    let mut core = core(true, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("cleanDist", TriggerReason::Manual));
    core.step(completed("cleanDist", TaskOutcome::Failed("busy".into())));

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(exit_request(&step).is_some_and(|failed| !failed.is_empty()));
}

#[test]
fn stopped_service_ends_a_resident_target() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("browsersync", TriggerReason::Manual));
    core.step(progressed("browsersync"));

    let step = core.step(completed(
        "browsersync",
        TaskOutcome::Failed("connection reset".into()),
    ));
    assert_eq!(exit_request(&step), Some(vec!["browsersync".to_string()]));
    assert!(!step.keep_running);
}

#[test]
fn service_failing_to_start_ends_a_resident_target() {
    let mut core = core(false, TriggerWhileRunningBehaviour::Queue);
    core.step(trigger("browsersync", TriggerReason::Manual));

    let step = core.step(completed(
        "browsersync",
        TaskOutcome::Failed("address in use".into()),
    ));
    assert_eq!(exit_request(&step), Some(vec!["browsersync".to_string()]));
}
