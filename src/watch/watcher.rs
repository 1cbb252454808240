// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{Result, SitepipeError};
use crate::tasks::TaskContext;
use crate::types::HashStorageMode;
use crate::watch::event_handler::{ChangeDispatcher, HashFilter};
use crate::watch::hash::{FileHashStore, HashStore, MemoryHashStore};
use crate::watch::patterns::standard_bindings;

/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching and ends the event loop.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    root: PathBuf,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Directory being watched recursively.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

/// Start watching the app directory with the standard bindings.
///
/// Matching paths trigger their task through `runtime_tx` or push a page
/// reload through the context's [`crate::server::ReloadHub`].
pub fn spawn_watcher(ctx: &TaskContext, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Result<WatcherHandle> {
    let root = ctx.layout.root().to_path_buf();
    let root = root.canonicalize().unwrap_or(root);
    let app_dir = root.join(ctx.layout.app_rel());
    if !app_dir.is_dir() {
        return Err(SitepipeError::MissingInput(format!(
            "app directory {:?} does not exist",
            app_dir
        )));
    }

    let hashing = ctx.config.watch.use_hash.then(|| {
        let store: Box<dyn HashStore> = match ctx.config.config.hash_storage_mode {
            HashStorageMode::File => Box::new(FileHashStore::new(root.clone(), Arc::clone(&ctx.fs))),
            HashStorageMode::Memory => Box::new(MemoryHashStore::new()),
        };
        HashFilter::new(store)
    });

    let dispatcher = ChangeDispatcher {
        root: root.clone(),
        fs: Arc::clone(&ctx.fs),
        bindings: Arc::new(standard_bindings(&ctx.layout)?),
        runtime_tx,
        reload: ctx.reload.clone(),
        hashing,
    };
    dispatcher.prime_hashes();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event_tx.send(event).is_err() {
                    debug!("watch event loop gone; dropping notify event");
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )
    .map_err(anyhow::Error::from)?;

    watcher
        .watch(&app_dir, RecursiveMode::Recursive)
        .map_err(anyhow::Error::from)?;

    info!(path = ?app_dir, "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");
            for path in &event.paths {
                if !dispatcher.process_file_change(&event.kind, path).await {
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        root: app_dir,
    })
}
