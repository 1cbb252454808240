// src/pipeline/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, SitepipeError};
use crate::pipeline::model::{Pipeline, RawPipeline};

impl TryFrom<RawPipeline> for Pipeline {
    type Error = SitepipeError;

    fn try_from(raw: RawPipeline) -> std::result::Result<Self, Self::Error> {
        validate_raw_pipeline(&raw)?;
        Ok(Pipeline::new_unchecked(raw.task))
    }
}

fn validate_raw_pipeline(raw: &RawPipeline) -> Result<()> {
    ensure_has_tasks(raw)?;
    validate_task_dependencies(raw)?;
    validate_dag(raw)?;
    Ok(())
}

fn ensure_has_tasks(raw: &RawPipeline) -> Result<()> {
    if raw.task.is_empty() {
        return Err(SitepipeError::ConfigError(
            "pipeline must contain at least one task".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(raw: &RawPipeline) -> Result<()> {
    for (name, task) in raw.task.iter() {
        for dep in task.after.iter() {
            if dep == name {
                return Err(SitepipeError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !raw.task.contains_key(dep) {
                return Err(SitepipeError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(raw: &RawPipeline) -> Result<()> {
    // Edge direction: dep -> task. `building` after `cleanDist` gives
    // cleanDist -> building.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in raw.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in raw.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(SitepipeError::DagCycle(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))),
    }
}
