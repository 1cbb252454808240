// src/tasks/html_include.rs

//! `htmlInclude`: expand include directives in the top-level templates.
//!
//! Directive syntax (with the default `@@` prefix):
//!
//! ```text
//! @@include('includes/header.html')
//! @@include("nav.html", {"title": "Home", "page": {"id": 3}})
//! ```
//!
//! - Paths resolve relative to the directory of the file containing the
//!   directive.
//! - The optional JSON object provides variables for the included file:
//!   `@@title` is replaced by `Home`, `@@page.id` by `3`. Strings are
//!   inserted verbatim, other values as JSON. Nested includes inherit the
//!   variables of their parent; inner objects override outer keys.
//! - Unknown variables are left untouched.
//! - A file that includes itself, directly or through other files, is an
//!   include-cycle error.

use std::path::{Component, Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use super::TaskContext;
use crate::errors::{Result, SitepipeError};
use crate::fs::FileSystem;
use crate::select::FileSelector;

type Vars = Map<String, Value>;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let layout = &ctx.layout;
    let includer = Includer::new(ctx.fs.as_ref(), &ctx.config.include.prefix)?;
    let templates =
        FileSelector::new(&[layout.templates_glob()])?.select(ctx.fs.as_ref(), layout.root())?;

    let app_dir = layout.app_dir();
    let mut failures = Vec::new();

    for template in &templates {
        let dest = app_dir.join(&template.relative);
        let expanded = includer.expand_file(&template.path);
        let written = expanded.and_then(|html| {
            ctx.fs
                .write(&dest, html.as_bytes())
                .map_err(SitepipeError::from)
        });

        match written {
            Ok(()) => {
                info!(from = ?template.path, to = ?dest, "page written");
                ctx.reload.notify_changed(&template.relative.to_string_lossy());
            }
            Err(err) => {
                error!(path = ?template.path, error = %err, "template expansion failed");
                failures.push(err);
            }
        }
    }

    let total = templates.len();
    match failures.len() {
        0 => Ok(()),
        failed => {
            info!(failed, total, "htmlInclude finished with failures");
            Err(failures.swap_remove(0))
        }
    }
}

/// Recursive include expander over a [`FileSystem`].
#[derive(Debug)]
pub struct Includer<'a> {
    fs: &'a dyn FileSystem,
    directive: Regex,
    variable: Regex,
}

impl<'a> Includer<'a> {
    pub fn new(fs: &'a dyn FileSystem, prefix: &str) -> Result<Self> {
        let p = regex::escape(prefix);
        let directive = Regex::new(&format!(
            r#"(?s){p}include\(\s*(?:'(?P<sq>[^']*)'|"(?P<dq>[^"]*)")\s*(?:,\s*(?P<vars>\{{.*?\}}))?\s*\)"#
        ))
        .map_err(|e| SitepipeError::ConfigError(format!("include prefix {prefix:?}: {e}")))?;
        let variable = Regex::new(&format!(r"{p}(?P<name>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)"))
            .map_err(|e| SitepipeError::ConfigError(format!("include prefix {prefix:?}: {e}")))?;

        Ok(Self {
            fs,
            directive,
            variable,
        })
    }

    /// Fully expand one template.
    pub fn expand_file(&self, path: &Path) -> Result<String> {
        let path = normalize(path);
        let source = self.fs.read_to_string(&path)?;
        let mut stack = vec![path.clone()];
        self.expand(&path, &source, &Vars::new(), &mut stack)
    }

    fn expand(&self, file: &Path, source: &str, vars: &Vars, stack: &mut Vec<PathBuf>) -> Result<String> {
        let source = self.substitute(source, vars);
        let dir = file.parent().unwrap_or(Path::new("."));

        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for caps in self.directive.captures_iter(&source) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&source[last..whole.start()]);
            last = whole.end();

            let rel = caps
                .name("sq")
                .or_else(|| caps.name("dq"))
                .map_or("", |m| m.as_str());
            let target = normalize(&dir.join(rel));

            if stack.contains(&target) {
                return Err(SitepipeError::IncludeCycle(target));
            }
            if !self.fs.is_file(&target) {
                return Err(SitepipeError::IncludeNotFound {
                    target,
                    from: file.to_path_buf(),
                });
            }

            let mut scoped = vars.clone();
            scoped.extend(self.parse_vars(file, &caps)?);

            debug!(from = ?file, include = ?target, "expanding include");
            let included = self.fs.read_to_string(&target)?;
            stack.push(target.clone());
            let expanded = self.expand(&target, &included, &scoped, stack)?;
            stack.pop();

            out.push_str(&expanded);
        }
        out.push_str(&source[last..]);

        Ok(out)
    }

    fn parse_vars(&self, file: &Path, caps: &Captures<'_>) -> Result<Vars> {
        let Some(raw) = caps.name("vars") else {
            return Ok(Vars::new());
        };
        match serde_json::from_str::<Value>(raw.as_str()) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SitepipeError::IncludeSyntax {
                file: file.to_path_buf(),
                message: "include variables must be a JSON object".to_string(),
            }),
            Err(e) => Err(SitepipeError::IncludeSyntax {
                file: file.to_path_buf(),
                message: format!("invalid include variables {:?}: {e}", raw.as_str()),
            }),
        }
    }

    fn substitute(&self, source: &str, vars: &Vars) -> String {
        if vars.is_empty() {
            return source.to_string();
        }
        self.variable
            .replace_all(source, |caps: &Captures<'_>| {
                let name = &caps["name"];
                // `@@file.css` with a string `file` keeps the `.css` suffix.
                let mut end = name.len();
                loop {
                    if let Some(value) = lookup(vars, &name[..end]) {
                        let rendered = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        return rendered + &name[end..];
                    }
                    match name[..end].rfind('.') {
                        Some(dot) => end = dot,
                        None => return caps[0].to_string(),
                    }
                }
            })
            .into_owned()
    }
}

/// Resolve a dotted name (`page.id`) against nested objects.
fn lookup<'v>(vars: &'v Vars, name: &str) -> Option<&'v Value> {
    let mut parts = name.split('.');
    let mut value = vars.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

/// Lexically fold `.` and `..` components, keeping a leading `./`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {
                if out.as_os_str().is_empty() {
                    out.push(".");
                }
            }
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn normalize_keeps_leading_dot() {
        assert_eq!(
            normalize(Path::new("./app/html/includes/../nav.html")),
            PathBuf::from("./app/html/nav.html")
        );
        assert_eq!(normalize(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn double_quotes_and_whitespace() {
        let fs = MockFileSystem::new();
        fs.add_file("./app/html/index.html", "<p>@@include( \"part.html\" )</p>");
        fs.add_file("./app/html/part.html", "x");

        let inc = Includer::new(&fs, "@@").unwrap();
        let out = inc.expand_file(Path::new("./app/html/index.html")).unwrap();
        assert_eq!(out, "<p>x</p>");
    }

    #[test]
    fn variables_are_scoped_and_inherited() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "./app/html/index.html",
            r#"@@include('a.html', {"title": "Home", "n": 2})|@@title"#,
        );
        fs.add_file("./app/html/a.html", "[@@title @@n @@include('b.html', {\"n\": 3})]");
        fs.add_file("./app/html/b.html", "(@@title @@n @@missing)");

        let inc = Includer::new(&fs, "@@").unwrap();
        let out = inc.expand_file(Path::new("./app/html/index.html")).unwrap();
        assert_eq!(out, "[Home 2 (Home 3 @@missing)]|@@title");
    }

    #[test]
    fn dotted_names_resolve_nested_values_or_keep_suffix() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "./app/html/index.html",
            r#"@@include('p.html', {"page": {"id": 3}, "sheet": "main"})"#,
        );
        fs.add_file("./app/html/p.html", "@@page.id @@sheet.css");

        let inc = Includer::new(&fs, "@@").unwrap();
        let out = inc.expand_file(Path::new("./app/html/index.html")).unwrap();
        assert_eq!(out, "3 main.css");
    }

    #[test]
    fn custom_prefix() {
        let fs = MockFileSystem::new();
        fs.add_file("./app/html/index.html", "$$include('p.html', {\"v\": \"ok\"})");
        fs.add_file("./app/html/p.html", "$$v");

        let inc = Includer::new(&fs, "$$").unwrap();
        assert_eq!(inc.expand_file(Path::new("./app/html/index.html")).unwrap(), "ok");
    }

    #[test]
    fn malformed_variables_are_rejected() {
        let fs = MockFileSystem::new();
        fs.add_file("./app/html/index.html", "@@include('p.html', {\"v\": })");
        fs.add_file("./app/html/p.html", "");

        let inc = Includer::new(&fs, "@@").unwrap();
        let err = inc.expand_file(Path::new("./app/html/index.html")).unwrap_err();
        assert!(matches!(err, SitepipeError::IncludeSyntax { .. }));
    }
}
