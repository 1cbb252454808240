// src/exec/mod.rs

//! Task execution layer.
//!
//! Runs the operations behind scheduled tasks and reports back to the
//! orchestration runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the main executor loop (one instance per name).
//! - [`task_runner`] runs a single task instance, one-shot or long-lived.
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` the runtime uses in production, which tests can
//!   replace with a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
