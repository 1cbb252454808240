// src/config/layout.rs

//! Project filesystem layout.
//!
//! Every task addresses its inputs and outputs through a [`Layout`], so the
//! directory names only live here. Patterns are relative to the project root
//! and always use forward slashes.

use std::path::{Path, PathBuf};

use crate::config::model::PathsSection;

pub const SCRIPT_ENTRY: &str = "js/main.js";
pub const SCRIPT_BUNDLE: &str = "js/main.min.js";
pub const STYLE_ENTRY: &str = "scss/style.scss";
pub const STYLE_EXPANDED: &str = "css/style.css";
pub const STYLE_COMPRESSED: &str = "css/style.min.css";

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    app: String,
    release: String,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, paths: &PathsSection) -> Self {
        Self {
            root: root.into(),
            app: clean_rel(&paths.app),
            release: clean_rel(&paths.release),
        }
    }

    /// Project root every pattern is evaluated against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `app` directory, relative to the root.
    pub fn app_rel(&self) -> &str {
        &self.app
    }

    pub fn app_dir(&self) -> PathBuf {
        self.root.join(&self.app)
    }

    pub fn release_dir(&self) -> PathBuf {
        self.root.join(&self.release)
    }

    /// `<root>/<app>/<rel>`
    pub fn app_path(&self, rel: &str) -> PathBuf {
        self.app_dir().join(rel)
    }

    /// `<app>/<rel>` as a root-relative pattern.
    pub fn app_pattern(&self, rel: &str) -> String {
        format!("{}/{}", self.app, rel)
    }

    /// Top-level templates: `<app>/html/*.html`.
    pub fn templates_glob(&self) -> String {
        self.app_pattern("html/*.html")
    }

    /// Whole template tree, includes included: `<app>/html/**/*.html`.
    pub fn template_tree_glob(&self) -> String {
        self.app_pattern("html/**/*.html")
    }

    pub fn images_glob(&self) -> String {
        self.app_pattern("img/**/*")
    }

    /// Input set of the `building` task, in the order it is copied.
    pub fn release_selection(&self) -> Vec<String> {
        vec![
            self.app_pattern(STYLE_COMPRESSED),
            self.app_pattern(STYLE_EXPANDED),
            self.app_pattern(SCRIPT_BUNDLE),
            self.app_pattern("*.html"),
            format!("!{}", self.app_pattern("html/**")),
            format!("!{}", self.app_pattern("html/includes/**")),
        ]
    }
}

fn clean_rel(raw: &str) -> String {
    let s = raw.replace('\\', "/");
    let s = s.trim_start_matches("./");
    s.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_follow_configured_dirs() {
        let paths = PathsSection {
            app: "./site/".to_string(),
            release: "public".to_string(),
        };
        let layout = Layout::new("/proj", &paths);

        assert_eq!(layout.templates_glob(), "site/html/*.html");
        assert_eq!(layout.app_path(SCRIPT_ENTRY), PathBuf::from("/proj/site/js/main.js"));
        assert_eq!(layout.release_dir(), PathBuf::from("/proj/public"));
        assert_eq!(layout.release_selection()[4], "!site/html/**");
    }
}
