// src/pipeline/mod.rs

//! The task graph.
//!
//! A [`Pipeline`] is a set of named tasks, each bound to a built-in
//! operation ([`TaskKind`]) and to the tasks it must run `after`. The
//! scheduler in [`crate::dag`] walks this graph; sequential composition is
//! an edge, parallel composition is the absence of one.
//!
//! [`Pipeline::standard`] is the website pipeline:
//!
//! ```text
//! styles  scripts  htmlInclude  browsersync*  watching*
//!
//! cleanDist ──> building
//!           └─> copyImages
//! ```
//!
//! (`*` = long-lived.) [`Target`]s name the entry points a user can invoke.

pub mod model;
pub mod target;
pub mod validate;

pub use model::{Pipeline, RawPipeline, TaskKind, TaskSpec};
pub use target::Target;
