// src/select.rs

//! File selection from ordered glob lists.
//!
//! A selector takes patterns in source order, e.g.
//!
//! ```text
//! ["app/css/style.css", "app/*.html", "!app/html/**"]
//! ```
//!
//! - Patterns prefixed with `!` exclude matches of every positive pattern.
//! - Positive patterns contribute files in declaration order; within one
//!   pattern files are sorted, and a file matched twice keeps its first slot.
//! - A positive pattern without glob characters names a single file that
//!   must exist; otherwise selection fails with a missing-input error.
//! - `*` never crosses a `/`; use `**` for recursive matches.
//!
//! All patterns are relative to a project root and use forward slashes.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::errors::{Result, SitepipeError};
use crate::fs::FileSystem;

/// A file chosen by a [`FileSelector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Absolute (root-joined) path to read from.
    pub path: PathBuf,
    /// Path relative to the base, i.e. where it lands under a destination.
    pub relative: PathBuf,
}

struct PositivePattern {
    raw: String,
    matcher: GlobMatcher,
    literal: bool,
    /// Leading directory without glob characters; the walk starts here.
    walk_base: String,
}

pub struct FileSelector {
    positives: Vec<PositivePattern>,
    negatives: Option<GlobSet>,
    base: Option<PathBuf>,
}

impl fmt::Debug for FileSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<&str> = self.positives.iter().map(|p| p.raw.as_str()).collect();
        f.debug_struct("FileSelector")
            .field("positives", &patterns)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl FileSelector {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut positives = Vec::new();
        let mut negatives = GlobSetBuilder::new();
        let mut has_negatives = false;

        for pat in patterns {
            let pat = pat.as_ref().trim();
            if let Some(neg) = pat.strip_prefix('!') {
                negatives.add(
                    GlobBuilder::new(neg)
                        .literal_separator(true)
                        .build()
                        .map_err(|e| invalid_pattern(pat, e))?,
                );
                has_negatives = true;
            } else {
                let matcher = GlobBuilder::new(pat)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| invalid_pattern(pat, e))?
                    .compile_matcher();
                positives.push(PositivePattern {
                    raw: pat.to_string(),
                    matcher,
                    literal: !has_glob_meta(pat),
                    walk_base: glob_base(pat),
                });
            }
        }

        let negatives = if has_negatives {
            Some(negatives.build().map_err(|e| {
                SitepipeError::ConfigError(format!("building exclude globset: {e}"))
            })?)
        } else {
            None
        };

        Ok(Self {
            positives,
            negatives,
            base: None,
        })
    }

    /// Use an explicit base (relative to the root) for [`SelectedFile::relative`]
    /// instead of each pattern's own leading directory.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Whether a root-relative path is selected (ignores existence).
    pub fn matches(&self, rel_path: &str) -> bool {
        !self.is_excluded(rel_path) && self.positives.iter().any(|p| p.matcher.is_match(rel_path))
    }

    fn is_excluded(&self, rel_path: &str) -> bool {
        self.negatives
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path))
    }

    /// Resolve the patterns against the filesystem under `root`.
    pub fn select(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<SelectedFile>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut selected = Vec::new();

        for pattern in &self.positives {
            let mut matched: Vec<String> = if pattern.literal {
                if !fs.is_file(&root.join(&pattern.raw)) {
                    return Err(SitepipeError::MissingInput(format!(
                        "no file matches {:?} under {:?}",
                        pattern.raw, root
                    )));
                }
                vec![pattern.raw.clone()]
            } else {
                walk_files(fs, root, &pattern.walk_base)?
                    .into_iter()
                    .filter(|rel| pattern.matcher.is_match(rel))
                    .collect()
            };
            matched.sort();

            for rel in matched {
                if self.is_excluded(&rel) || !seen.insert(rel.clone()) {
                    continue;
                }
                let relative = self.relative_to_base(&rel, pattern);
                selected.push(SelectedFile {
                    path: root.join(&rel),
                    relative,
                });
            }
        }

        Ok(selected)
    }

    fn relative_to_base(&self, rel: &str, pattern: &PositivePattern) -> PathBuf {
        let rel_path = Path::new(rel);
        let base = match &self.base {
            Some(base) => base.clone(),
            None if pattern.literal => rel_path.parent().map(Path::to_path_buf).unwrap_or_default(),
            None => PathBuf::from(&pattern.walk_base),
        };
        rel_path
            .strip_prefix(&base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| rel_path.to_path_buf())
    }
}

fn invalid_pattern(pat: &str, err: globset::Error) -> SitepipeError {
    SitepipeError::ConfigError(format!("invalid glob pattern {pat:?}: {err}"))
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Directory prefix of a pattern up to the first component with glob
/// characters: `app/img/**/*` -> `app/img`.
pub fn glob_base(pattern: &str) -> String {
    let mut parts = Vec::new();
    let components: Vec<&str> = pattern.split('/').collect();
    for (idx, comp) in components.iter().enumerate() {
        if has_glob_meta(comp) || idx + 1 == components.len() {
            break;
        }
        parts.push(*comp);
    }
    parts.join("/")
}

/// All files below `root/start`, as root-relative forward-slash strings.
///
/// A missing start directory yields no files.
fn walk_files(fs: &dyn FileSystem, root: &Path, start: &str) -> Result<Vec<String>> {
    let start_dir = if start.is_empty() {
        root.to_path_buf()
    } else {
        root.join(start)
    };
    if !fs.is_dir(&start_dir) {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut stack = vec![start_dir];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    files.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_base_stops_at_first_glob_component() {
        assert_eq!(glob_base("app/img/**/*"), "app/img");
        assert_eq!(glob_base("app/*.html"), "app");
        assert_eq!(glob_base("*.html"), "");
        assert_eq!(glob_base("app/js/main.js"), "app/js");
    }

    #[test]
    fn star_does_not_cross_directories() {
        let sel = FileSelector::new(&["app/*.html"]).unwrap();
        assert!(sel.matches("app/index.html"));
        assert!(!sel.matches("app/html/index.html"));
    }

    #[test]
    fn negation_removes_matches() {
        let sel = FileSelector::new(&["app/**/*.js", "!app/**/*.min.js"]).unwrap();
        assert!(sel.matches("app/js/main.js"));
        assert!(sel.matches("app/js/vendor/lib.js"));
        assert!(!sel.matches("app/js/main.min.js"));
    }
}
