// src/tasks/mod.rs

//! The built-in task operations.
//!
//! Every one-shot task is a blocking function over a [`TaskContext`]: it
//! reads its inputs through the context's [`FileSystem`], writes its outputs
//! and returns `Ok(())` or the error that failed it. The executor runs them
//! on Tokio's blocking pool (see `exec::task_runner`).
//!
//! The long-lived tasks (`browsersync`, `watching`) are async and live in
//! [`crate::server`] and [`crate::watch`].

use std::sync::Arc;

use anyhow::anyhow;

use crate::config::{ConfigFile, Layout};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::TaskKind;
use crate::server::ReloadHub;

pub mod clean;
pub mod copy;
pub mod html_include;
pub mod produce;
pub mod scripts;
pub mod styles;

/// Shared state every task runs against.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub fs: Arc<dyn FileSystem>,
    pub layout: Layout,
    pub config: ConfigFile,
    /// Live-reload notifications; dropped when no dev server is listening.
    pub reload: ReloadHub,
}

impl TaskContext {
    pub fn new(fs: Arc<dyn FileSystem>, layout: Layout, config: ConfigFile) -> Self {
        Self {
            fs,
            layout,
            config,
            reload: ReloadHub::new(),
        }
    }
}

/// Run a one-shot task to completion on the current thread.
pub fn run_one_shot(kind: TaskKind, ctx: &TaskContext) -> Result<()> {
    match kind {
        TaskKind::Styles => styles::run(ctx),
        TaskKind::Scripts => scripts::run(ctx),
        TaskKind::HtmlInclude => html_include::run(ctx),
        TaskKind::CleanDist => clean::run(ctx),
        TaskKind::Building => produce::run(ctx),
        TaskKind::CopyImages => copy::run(ctx),
        TaskKind::BrowserSync | TaskKind::Watching => {
            Err(anyhow!("{kind} is long-lived and cannot run as a one-shot task").into())
        }
    }
}
