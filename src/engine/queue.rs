// src/engine/queue.rs

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use super::TaskName;
use crate::types::TriggerWhileRunningBehaviour;

/// Triggers that arrived for tasks already taking part in the active run.
///
/// Each entry is a batch of task names seeding one future run; runs take
/// batches oldest first.
///
/// - `Queue`: a trigger joins the newest batch, unless that batch already
///   holds the task, in which case it opens a new batch. With `max_runs`
///   batches queued, triggers merge into the newest batch instead.
/// - `Cancel`: a new trigger replaces everything queued so far.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<BTreeSet<TaskName>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        Self {
            behaviour,
            max_runs: max_runs.max(1),
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.behaviour
    }

    pub fn record_trigger(&mut self, task: &str) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                let full = self.runs.len() >= self.max_runs;
                match self.runs.back_mut() {
                    Some(batch) if full || !batch.contains(task) => {
                        let inserted = batch.insert(task.to_string());
                        if full && !inserted {
                            debug!(task = %task, max_runs = self.max_runs, "queue full; trigger coalesced");
                        } else {
                            debug!(task = %task, "merged trigger into queued batch");
                        }
                    }
                    _ => {
                        self.runs.push_back(BTreeSet::from([task.to_string()]));
                        debug!(task = %task, queued = self.runs.len(), "queued trigger for a later run");
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(task = %task, "replacing queued batches with this trigger (cancel mode)");
                self.runs.clear();
                self.runs.push_back(BTreeSet::from([task.to_string()]));
            }
        }
    }

    /// Remove and return the oldest batch, sorted by name.
    pub fn take_next(&mut self) -> Vec<TaskName> {
        let batch = self.runs.pop_front().unwrap_or_default();
        debug!(tasks = batch.len(), remaining = self.runs.len(), "took queued batch");
        batch.into_iter().collect()
    }
}
