// src/watch/mod.rs

//! File watching and change detection for the `watching` task.
//!
//! This module is responsible for:
//! - The standard watch bindings: glob set -> task or page reload.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - (Optionally) content hashing, so saving an unchanged file triggers
//!   nothing.
//!
//! It does not know about the DAG; it only turns filesystem changes into
//! task-level triggers.

pub mod cache;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event_handler::{ChangeDispatcher, HashFilter};
pub use hash::{FileHashStore, HashStore, MemoryHashStore, HASH_FILE_PATH};
pub use patterns::{standard_bindings, EventFilter, WatchAction, WatchBinding};
pub use watcher::{spawn_watcher, WatcherHandle};
