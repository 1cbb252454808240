// src/dag/mod.rs

//! Task graph adjacency and the per-run scheduler.
//!
//! The [`Scheduler`] numbers runs, tracks each task's [`TaskRunState`] in
//! the [`state_manager::TaskTable`] and hands out [`ScheduledTask`]s once
//! their dependencies have succeeded (or, for long-lived tasks, progressed).

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, TaskRunState};
