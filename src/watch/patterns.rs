// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use notify::EventKind;

use crate::config::Layout;
use crate::engine::TaskName;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::TaskKind;
use crate::select::FileSelector;

/// What a binding does when one of its files changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Trigger a task in the runtime.
    RunTask(TaskName),
    /// Tell live-reload clients to reload the page; no task runs.
    ReloadPage,
}

impl fmt::Display for WatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchAction::RunTask(task) => f.write_str(task),
            WatchAction::ReloadPage => f.write_str("reload"),
        }
    }
}

/// Which filesystem events a binding reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Created, modified and removed files.
    AnyChange,
    /// Modifications of existing files only.
    ModifyOnly,
}

impl EventFilter {
    pub fn accepts(self, kind: &EventKind) -> bool {
        match self {
            EventFilter::AnyChange => matches!(
                kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ),
            EventFilter::ModifyOnly => matches!(kind, EventKind::Modify(_)),
        }
    }
}

/// A glob set bound to an action.
///
/// Patterns are relative to the project root; the watcher passes relative
/// paths (e.g. `"app/scss/base.scss"`) into [`WatchBinding::matches`].
pub struct WatchBinding {
    patterns: Vec<String>,
    selector: FileSelector,
    action: WatchAction,
    events: EventFilter,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("patterns", &self.patterns)
            .field("action", &self.action)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(patterns: Vec<String>, action: WatchAction, events: EventFilter) -> Result<Self> {
        let selector = FileSelector::new(&patterns)?;
        Ok(Self {
            patterns,
            selector,
            action,
            events,
        })
    }

    pub fn action(&self) -> &WatchAction {
        &self.action
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Key under which this binding's content hash is stored.
    pub fn hash_key(&self) -> String {
        self.action.to_string()
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.selector.matches(rel_path)
    }

    pub fn reacts_to(&self, kind: &EventKind) -> bool {
        self.events.accepts(kind)
    }
}

/// The development bindings, in registration order.
pub fn standard_bindings(layout: &Layout) -> Result<Vec<WatchBinding>> {
    let task = |kind: TaskKind| WatchAction::RunTask(kind.name().to_string());

    Ok(vec![
        WatchBinding::new(
            vec![layout.app_pattern("scss/**/*.scss")],
            task(TaskKind::Styles),
            EventFilter::AnyChange,
        )?,
        WatchBinding::new(
            vec![
                layout.app_pattern("**/*.js"),
                format!("!{}", layout.app_pattern("**/*.min.js")),
            ],
            task(TaskKind::Scripts),
            EventFilter::AnyChange,
        )?,
        WatchBinding::new(
            vec![layout.template_tree_glob()],
            task(TaskKind::HtmlInclude),
            EventFilter::AnyChange,
        )?,
        WatchBinding::new(
            vec![layout.app_pattern("*.html")],
            WatchAction::ReloadPage,
            EventFilter::ModifyOnly,
        )?,
    ])
}

/// All existing files under `root` selected by the binding, in selection
/// order. Used for content hashing.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    binding: &WatchBinding,
) -> Result<Vec<PathBuf>> {
    let files = binding.selector.select(fs, root)?;
    Ok(files.into_iter().map(|f| f.path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathsSection;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn bindings() -> Vec<WatchBinding> {
        standard_bindings(&Layout::new(".", &PathsSection::default())).unwrap()
    }

    fn actions_for(rel: &str) -> Vec<String> {
        bindings()
            .iter()
            .filter(|b| b.matches(rel))
            .map(|b| b.action().to_string())
            .collect()
    }

    #[test]
    fn paths_route_to_their_binding() {
        assert_eq!(actions_for("app/scss/parts/_nav.scss"), vec!["styles"]);
        assert_eq!(actions_for("app/js/main.js"), vec!["scripts"]);
        assert_eq!(actions_for("app/html/includes/header.html"), vec!["htmlInclude"]);
        assert_eq!(actions_for("app/index.html"), vec!["reload"]);
    }

    #[test]
    fn bundle_output_is_not_watched() {
        assert!(actions_for("app/js/main.min.js").is_empty());
        assert!(actions_for("app/css/style.css").is_empty());
    }

    #[test]
    fn page_reload_ignores_create_and_remove() {
        let b = bindings();
        let reload = &b[3];
        assert!(reload.reacts_to(&EventKind::Modify(ModifyKind::Any)));
        assert!(!reload.reacts_to(&EventKind::Create(CreateKind::File)));
        assert!(!reload.reacts_to(&EventKind::Remove(RemoveKind::File)));
        assert!(b[0].reacts_to(&EventKind::Remove(RemoveKind::File)));
    }
}
