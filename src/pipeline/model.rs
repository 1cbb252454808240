// src/pipeline/model.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::TaskName;
use crate::errors::Result;

/// Built-in operation a task node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Compile the SCSS entry in expanded and compressed modes.
    Styles,
    /// Concatenate + minify the script entry.
    Scripts,
    /// Expand `@@include` directives of the top-level templates.
    HtmlInclude,
    /// Dev HTTP server with live reload.
    BrowserSync,
    /// Filesystem watcher dispatching tasks on change.
    Watching,
    /// Delete the release directory.
    CleanDist,
    /// Copy compiled outputs and top-level pages into the release directory.
    Building,
    /// Copy the image tree into the release directory.
    CopyImages,
}

impl TaskKind {
    pub const ALL: [TaskKind; 8] = [
        TaskKind::Styles,
        TaskKind::Scripts,
        TaskKind::HtmlInclude,
        TaskKind::BrowserSync,
        TaskKind::Watching,
        TaskKind::CleanDist,
        TaskKind::Building,
        TaskKind::CopyImages,
    ];

    /// Task name used in the standard pipeline and on the CLI.
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Styles => "styles",
            TaskKind::Scripts => "scripts",
            TaskKind::HtmlInclude => "htmlInclude",
            TaskKind::BrowserSync => "browsersync",
            TaskKind::Watching => "watching",
            TaskKind::CleanDist => "cleanDist",
            TaskKind::Building => "building",
            TaskKind::CopyImages => "copyImages",
        }
    }

    /// Long-lived tasks report progress once ready and keep running.
    pub fn long_lived(self) -> bool {
        matches!(self, TaskKind::BrowserSync | TaskKind::Watching)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One node of the task graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub kind: TaskKind,
    /// Tasks that must complete (or progress) before this one starts.
    pub after: Vec<TaskName>,
}

impl TaskSpec {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            after: Vec::new(),
        }
    }

    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.after.push(dep.into());
        self
    }
}

/// Unvalidated task graph.
#[derive(Debug, Clone, Default)]
pub struct RawPipeline {
    pub task: BTreeMap<TaskName, TaskSpec>,
}

/// Validated task graph: every `after` reference exists and there are no
/// cycles (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct Pipeline {
    task: BTreeMap<TaskName, TaskSpec>,
}

impl Pipeline {
    pub(crate) fn new_unchecked(task: BTreeMap<TaskName, TaskSpec>) -> Self {
        Self { task }
    }

    /// The website pipeline: five independent development tasks plus the
    /// `cleanDist -> (building, copyImages)` release chain.
    pub fn standard() -> Result<Self> {
        let mut raw = RawPipeline::default();
        for kind in TaskKind::ALL {
            let spec = match kind {
                TaskKind::Building | TaskKind::CopyImages => {
                    TaskSpec::new(kind).after(TaskKind::CleanDist.name())
                }
                _ => TaskSpec::new(kind),
            };
            raw.task.insert(kind.name().to_string(), spec);
        }
        Pipeline::try_from(raw)
    }

    pub fn tasks(&self) -> &BTreeMap<TaskName, TaskSpec> {
        &self.task
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.task.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.task.contains_key(name)
    }
}
