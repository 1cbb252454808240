// src/watch/event_handler.rs

//! Turns filesystem events into task triggers and page reloads.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::server::ReloadHub;
use crate::watch::cache::FileCache;
use crate::watch::hash::{compute_aggregate_hash, HashStore};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{collect_matching_files, WatchAction, WatchBinding};

/// Content-hash gate shared by all bindings (`[watch] use_hash = true`).
#[derive(Debug, Clone)]
pub struct HashFilter {
    store: Arc<Mutex<Box<dyn HashStore>>>,
    cache: Arc<Mutex<FileCache>>,
}

impl HashFilter {
    pub fn new(store: Box<dyn HashStore>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            cache: Arc::new(Mutex::new(FileCache::new())),
        }
    }
}

/// Everything needed to react to one change.
#[derive(Debug, Clone)]
pub struct ChangeDispatcher {
    pub root: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    pub bindings: Arc<Vec<WatchBinding>>,
    pub runtime_tx: mpsc::Sender<RuntimeEvent>,
    pub reload: ReloadHub,
    pub hashing: Option<HashFilter>,
}

impl ChangeDispatcher {
    /// Run every binding that matches `path` and accepts `kind`, in
    /// registration order.
    ///
    /// Returns `false` once the runtime channel is closed.
    pub async fn process_file_change(&self, kind: &EventKind, path: &Path) -> bool {
        let Some(rel) = relative_str(&self.root, path) else {
            debug!(?path, root = ?self.root, "event outside project root; ignoring");
            return true;
        };

        for binding in self.bindings.iter() {
            if !binding.reacts_to(kind) || !binding.matches(&rel) {
                continue;
            }

            if !self.content_changed(binding, path, &rel).await {
                continue;
            }

            match binding.action() {
                WatchAction::RunTask(task) => {
                    debug!(task = %task, path = %rel, "watch match -> triggering task");
                    let event = RuntimeEvent::TaskTriggered {
                        task: task.clone(),
                        reason: TriggerReason::FileWatch,
                    };
                    if let Err(err) = self.runtime_tx.send(event).await {
                        warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
                        return false;
                    }
                }
                WatchAction::ReloadPage => {
                    debug!(path = %rel, "page changed -> reloading clients");
                    self.reload.reload_page();
                }
            }
        }

        true
    }

    /// Record the current content hash of every binding, so the first
    /// event after startup is compared against the files as they were.
    pub fn prime_hashes(&self) {
        let Some(filter) = &self.hashing else { return };
        let (Ok(mut cache), Ok(mut store)) = (filter.cache.lock(), filter.store.lock()) else {
            warn!("hash state mutex poisoned; not priming hashes");
            return;
        };

        let keys: Vec<String> = self.bindings.iter().map(WatchBinding::hash_key).collect();
        if let Err(err) = store.prune(&keys) {
            warn!(error = %err, "failed to prune stale binding hashes");
        }

        for (binding, key) in self.bindings.iter().zip(&keys) {
            let hash = collect_matching_files(self.fs.as_ref(), &self.root, binding)
                .map_err(anyhow::Error::from)
                .and_then(|files| aggregate_hash(self.fs.as_ref(), files, &mut cache));
            match hash.and_then(|hash| store.save(key, &hash)) {
                Ok(()) => debug!(binding = %key, "primed binding hash"),
                Err(err) => warn!(binding = %key, error = %err, "failed to prime binding hash"),
            }
        }
    }

    /// Hash gate: true when hashing is off, when the binding's aggregate
    /// hash changed, or when hashing failed.
    async fn content_changed(&self, binding: &WatchBinding, abs_path: &Path, rel: &str) -> bool {
        let Some(filter) = self.hashing.clone() else {
            return true;
        };

        let fs = Arc::clone(&self.fs);
        let root = self.root.clone();
        let abs_path = abs_path.to_path_buf();
        let rel = rel.to_string();
        let key = binding.hash_key();
        let files = match collect_matching_files(fs.as_ref(), &root, binding) {
            Ok(files) => files,
            Err(err) => {
                warn!(binding = %key, error = %err, "failed to collect watched files; triggering anyway");
                return true;
            }
        };

        tokio::task::spawn_blocking(move || {
            let new_hash = {
                let Ok(mut cache) = filter.cache.lock() else {
                    warn!("file cache mutex poisoned; triggering anyway");
                    return true;
                };
                cache.invalidate(&abs_path);
                match aggregate_hash(fs.as_ref(), files, &mut cache) {
                    Ok(hash) => hash,
                    Err(err) => {
                        warn!(binding = %key, error = %err, "failed to hash files; triggering anyway");
                        return true;
                    }
                }
            };

            let Ok(mut store) = filter.store.lock() else {
                warn!(binding = %key, "hash store mutex poisoned; triggering anyway");
                return true;
            };

            match store.load(&key) {
                Ok(Some(old)) if old == new_hash => {
                    info!(binding = %key, path = %rel, "content unchanged; skipping trigger");
                    false
                }
                Ok(_) => {
                    if let Err(err) = store.save(&key, &new_hash) {
                        warn!(binding = %key, error = %err, "failed to save binding hash");
                    }
                    true
                }
                Err(err) => {
                    warn!(binding = %key, error = %err, "failed to load binding hash; triggering anyway");
                    true
                }
            }
        })
        .await
        .unwrap_or(true)
    }
}

fn aggregate_hash(
    fs: &dyn FileSystem,
    files: Vec<PathBuf>,
    cache: &mut FileCache,
) -> anyhow::Result<String> {
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let hash = cache.get_or_compute(fs, &file)?;
        entries.push((file, hash));
    }
    Ok(compute_aggregate_hash(&entries))
}
