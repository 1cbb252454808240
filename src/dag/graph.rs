// src/dag/graph.rs

use std::collections::BTreeMap;

use crate::engine::TaskName;
use crate::pipeline::Pipeline;

/// Adjacency lists for both edge directions of a validated [`Pipeline`].
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    upstream: BTreeMap<TaskName, Vec<TaskName>>,
    downstream: BTreeMap<TaskName, Vec<TaskName>>,
}

impl DagGraph {
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        let mut graph = Self::default();
        for (name, task) in pipeline.tasks() {
            graph.upstream.insert(name.clone(), task.after.clone());
            graph.downstream.entry(name.clone()).or_default();
            for dep in &task.after {
                graph.downstream.entry(dep.clone()).or_default().push(name.clone());
            }
        }
        graph
    }

    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.upstream.keys().map(String::as_str)
    }

    /// The task's `after` list.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.upstream.get(name).map_or(&[], Vec::as_slice)
    }

    /// Tasks whose `after` list names `name`.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.downstream.get(name).map_or(&[], Vec::as_slice)
    }
}
