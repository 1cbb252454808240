// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod select;
pub mod server;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile, Layout};
use crate::dag::Scheduler;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::Result;
use crate::exec::RealExecutorBackend;
use crate::fs::RealFileSystem;
use crate::pipeline::{Pipeline, Target};
use crate::tasks::TaskContext;

/// High-level entry point used by `main.rs`.
///
/// Resolves the target, root and config, then hands over to [`run_target`]
/// (or prints the plan with `--dry-run`).
pub async fn run(args: CliArgs) -> Result<()> {
    let target: Target = args.target.parse()?;
    let root = project_root(args.root.as_deref(), args.config.as_deref());
    let cfg = load_or_default(args.config.as_deref(), &root)?;
    let layout = Layout::new(&root, &cfg.paths);
    let pipeline = Pipeline::standard()?;

    if args.dry_run {
        print_dry_run(&cfg, &layout, &pipeline, target);
        return Ok(());
    }

    let ctx = Arc::new(TaskContext::new(Arc::new(RealFileSystem), layout, cfg));
    run_target(target, ctx, &pipeline).await
}

/// Run one target against a task context until it is done (one-shot
/// targets) or interrupted (resident targets).
///
/// This wires together:
/// - scheduler / queue / runtime
/// - executor
/// - Ctrl-C handling
pub async fn run_target(target: Target, ctx: Arc<TaskContext>, pipeline: &Pipeline) -> Result<()> {
    let scheduler = Scheduler::from_pipeline(pipeline);

    let behaviour = ctx.config.config.triggered_while_running_behaviour;
    let queue_length = ctx.config.config.queue_length;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone(), Arc::clone(&ctx));

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let roots = target.roots();
    info!(%target, ?roots, "seeding target roots");

    for task in roots {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::Manual,
            })
            .await
            .map_err(anyhow::Error::from)?;
    }

    let options = RuntimeOptions {
        exit_when_idle: !target.is_resident(pipeline),
    };

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(scheduler, behaviour, queue_length, options);

    // Construct the async IO shell around the core.
    let runtime = Runtime::new(core, rt_rx, executor);
    runtime.run().await
}

/// Project root: `--root`, else the directory of `--config`, else the
/// working directory.
fn project_root(root: Option<&Path>, config: Option<&Path>) -> PathBuf {
    if let Some(root) = root {
        return root.to_path_buf();
    }
    match config.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print the resolved configuration and task graph.
fn print_dry_run(cfg: &ConfigFile, layout: &Layout, pipeline: &Pipeline, target: Target) {
    println!("sitepipe dry-run");
    println!("  target = {target} (roots: {:?}, resident: {})", target.roots(), target.is_resident(pipeline));
    println!("  root = {:?}", layout.root());
    println!("  paths.app = {:?}", layout.app_dir());
    println!("  paths.release = {:?}", layout.release_dir());
    println!(
        "  config.triggered_while_running_behaviour = {:?}",
        cfg.config.triggered_while_running_behaviour
    );
    println!("  config.queue_length = {}", cfg.config.queue_length);
    println!("  server = {}:{}", cfg.server.host, cfg.server.port);
    println!("  watch.use_hash = {}", cfg.watch.use_hash);
    println!();

    println!("tasks ({}):", pipeline.tasks().len());
    for (name, spec) in pipeline.tasks() {
        println!("  - {name}");
        if !spec.after.is_empty() {
            println!("      after: {:?}", spec.after);
        }
        if spec.kind.long_lived() {
            println!("      long_lived: true");
        }
    }

    match watch::standard_bindings(layout) {
        Ok(bindings) => {
            println!();
            println!("watch bindings ({}):", bindings.len());
            for binding in &bindings {
                println!("  - {:?} -> {}", binding.patterns(), binding.action());
            }
        }
        Err(err) => println!("watch bindings: invalid ({err})"),
    }

    debug!("dry-run complete (no execution)");
}
