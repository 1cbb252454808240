// src/pipeline/target.rs

use std::fmt;
use std::str::FromStr;

use crate::engine::TaskName;
use crate::errors::SitepipeError;
use crate::pipeline::model::{Pipeline, TaskKind};

/// An entry point the user can invoke from the CLI.
///
/// Single-task targets seed exactly that task. Composite targets seed a set
/// of roots; the task graph pulls in everything downstream of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Styles,
    Scripts,
    Watching,
    BrowserSync,
    HtmlInclude,
    /// `cleanDist`, then `building` and `copyImages` in parallel.
    Build,
    /// All development tasks in parallel; resident.
    Default,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::Styles,
        Target::Scripts,
        Target::Watching,
        Target::BrowserSync,
        Target::HtmlInclude,
        Target::Build,
        Target::Default,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::Styles => "styles",
            Target::Scripts => "scripts",
            Target::Watching => "watching",
            Target::BrowserSync => "browsersync",
            Target::HtmlInclude => "htmlInclude",
            Target::Build => "build",
            Target::Default => "default",
        }
    }

    /// Tasks to trigger when the target starts.
    pub fn roots(self) -> Vec<TaskName> {
        let kinds: &[TaskKind] = match self {
            Target::Styles => &[TaskKind::Styles],
            Target::Scripts => &[TaskKind::Scripts],
            Target::Watching => &[TaskKind::Watching],
            Target::BrowserSync => &[TaskKind::BrowserSync],
            Target::HtmlInclude => &[TaskKind::HtmlInclude],
            Target::Build => &[TaskKind::CleanDist],
            Target::Default => &[
                TaskKind::Styles,
                TaskKind::Scripts,
                TaskKind::BrowserSync,
                TaskKind::Watching,
                TaskKind::HtmlInclude,
            ],
        };
        kinds.iter().map(|k| k.name().to_string()).collect()
    }

    /// Whether the process stays up after the initial run: true when any
    /// root is long-lived.
    pub fn is_resident(self, pipeline: &Pipeline) -> bool {
        self.roots().iter().any(|name| {
            pipeline
                .get(name)
                .is_some_and(|spec| spec.kind.long_lived())
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = SitepipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "styles" => Ok(Target::Styles),
            "scripts" => Ok(Target::Scripts),
            "watching" => Ok(Target::Watching),
            "browsersync" => Ok(Target::BrowserSync),
            "htmlInclude" | "html-include" => Ok(Target::HtmlInclude),
            "build" => Ok(Target::Build),
            "default" => Ok(Target::Default),
            other => Err(SitepipeError::UnknownTarget(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residency_follows_long_lived_roots() {
        let p = Pipeline::standard().unwrap();
        assert!(Target::Default.is_resident(&p));
        assert!(Target::BrowserSync.is_resident(&p));
        assert!(!Target::Build.is_resident(&p));
        assert!(!Target::Styles.is_resident(&p));
    }

    #[test]
    fn every_root_exists_in_the_standard_pipeline() {
        let p = Pipeline::standard().unwrap();
        for target in Target::ALL {
            for root in target.roots() {
                assert!(p.contains(&root), "{target}: {root}");
            }
        }
    }

    #[test]
    fn html_include_accepts_both_spellings() {
        assert_eq!("htmlInclude".parse::<Target>().unwrap(), Target::HtmlInclude);
        assert_eq!("html-include".parse::<Target>().unwrap(), Target::HtmlInclude);
        assert!("cleanDist".parse::<Target>().is_err());
    }
}
