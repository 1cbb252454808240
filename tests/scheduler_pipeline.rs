// tests/scheduler_pipeline.rs

mod common;

use std::collections::BTreeSet;

use common::builders::PipelineBuilder;
use sitepipe::dag::{ScheduledTask, Scheduler, TaskRunState};
use sitepipe::engine::TaskOutcome;
use sitepipe::pipeline::{Pipeline, Target};

fn names(tasks: &[ScheduledTask]) -> Vec<String> {
    tasks.iter().map(|t| t.name.clone()).collect()
}

fn standard() -> Scheduler {
    Scheduler::from_pipeline(&Pipeline::standard().unwrap())
}

#[test]
fn build_runs_clean_then_copies_in_parallel() {
    common::init_tracing();
    let mut sched = standard();

    let step = sched.step_trigger("cleanDist");
    assert_eq!(names(&step.newly_scheduled), vec!["cleanDist"]);
    assert!(!step.run_just_finished);

    let step = sched.step_completion("cleanDist", TaskOutcome::Success);
    assert_eq!(names(&step.newly_scheduled), vec!["building", "copyImages"]);
    assert!(!step.run_just_finished);

    let step = sched.step_completion("copyImages", TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert!(!step.run_just_finished);

    let step = sched.step_completion("building", TaskOutcome::Success);
    assert!(step.run_just_finished);
    assert!(sched.is_idle());
}

#[test]
fn failed_clean_fails_both_copies() {
    common::init_tracing();
    let mut sched = standard();
    sched.step_trigger("cleanDist");

    let step = sched.step_completion("cleanDist", TaskOutcome::Failed("permission denied".into()));
    assert!(step.newly_scheduled.is_empty());
    assert!(step.run_just_finished);

    let failed: BTreeSet<String> = step.newly_failed.into_iter().collect();
    let expected: BTreeSet<String> = ["cleanDist", "building", "copyImages"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(failed, expected);
}

#[test]
fn default_roots_are_all_dispatched_immediately() {
    common::init_tracing();
    let mut sched = standard();

    let mut dispatched = Vec::new();
    for root in Target::Default.roots() {
        let step = sched.step_trigger(&root);
        dispatched.extend(names(&step.newly_scheduled));
    }
    dispatched.sort();
    assert_eq!(
        dispatched,
        vec!["browsersync", "htmlInclude", "scripts", "styles", "watching"]
    );

    // Nothing downstream of the development tasks.
    for task in ["styles", "scripts", "htmlInclude"] {
        let step = sched.step_completion(task, TaskOutcome::Success);
        assert!(step.newly_scheduled.is_empty());
        assert!(!step.run_just_finished, "long-lived tasks keep the run open");
    }

    sched.step_progress("browsersync");
    let step = sched.step_progress("watching");
    assert!(step.run_just_finished);
    assert!(sched.is_idle());
}

#[test]
fn release_tasks_are_not_pulled_into_a_development_run() {
    let mut sched = standard();
    sched.step_trigger("styles");

    let mut in_run = sched.tasks_in_current_run();
    in_run.sort();
    assert_eq!(in_run, vec!["styles"]);
    assert_eq!(sched.run_state_of("building"), Some(TaskRunState::NotInRun));
}

#[test]
fn progress_and_completion_for_idle_tasks_are_ignored() {
    let mut sched = standard();

    let step = sched.step_completion("styles", TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert!(step.newly_failed.is_empty());

    let step = sched.step_progress("watching");
    assert!(step.newly_scheduled.is_empty());
    assert!(sched.is_idle());
}

#[test]
fn long_lived_progress_unblocks_dependents() {
    let pipeline = PipelineBuilder::new()
        .long_lived("serve", &[])
        .task("open", &["serve"])
        .build();
    let mut sched = Scheduler::from_pipeline(&pipeline);

    let step = sched.step_trigger("serve");
    assert_eq!(names(&step.newly_scheduled), vec!["serve"]);

    let step = sched.step_progress("serve");
    assert_eq!(names(&step.newly_scheduled), vec!["open"]);

    let step = sched.step_completion("open", TaskOutcome::Success);
    assert!(step.run_just_finished);
}

#[test]
fn long_lived_tasks_are_flagged() {
    let sched = standard();
    assert!(sched.is_long_lived("watching"));
    assert!(sched.is_long_lived("browsersync"));
    assert!(!sched.is_long_lived("styles"));
    assert!(!sched.is_long_lived("unknown"));
}
