// src/tasks/styles.rs

use std::io;
use std::path::Path;

use codemap::SpanLoc;
use grass::OutputStyle;
use tracing::{debug, error, info, warn};

use super::TaskContext;
use crate::config::layout::{STYLE_COMPRESSED, STYLE_ENTRY, STYLE_EXPANDED};
use crate::errors::{Result, SitepipeError};
use crate::fs::FileSystem;

/// `styles`: compile the SCSS entry twice, expanded to `css/style.css` and
/// compressed to `css/style.min.css`.
///
/// Both builds always run. Each successful write pushes a stylesheet
/// refresh; the task fails with the first error if either build failed.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let layout = &ctx.layout;
    let entry = layout.app_path(STYLE_ENTRY);
    if !ctx.fs.is_file(&entry) {
        return Err(SitepipeError::MissingInput(format!(
            "style entry {:?} does not exist",
            entry
        )));
    }

    let mut first_error = None;
    for (style, output) in [
        (OutputStyle::Expanded, STYLE_EXPANDED),
        (OutputStyle::Compressed, STYLE_COMPRESSED),
    ] {
        let dest = layout.app_path(output);
        let result = compile(ctx.fs.as_ref(), &entry, style)
            .and_then(|css| ctx.fs.write(&dest, css.as_bytes()).map_err(SitepipeError::from));

        match result {
            Ok(()) => {
                info!(path = ?dest, ?style, "stylesheet written");
                ctx.reload.notify_changed(output);
            }
            Err(err) => {
                error!(path = ?dest, ?style, error = %err, "stylesheet build failed");
                first_error.get_or_insert(err);
            }
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// Compile one SCSS file. Imports resolve relative to the file and to its
/// directory, through `fs`.
pub fn compile(fs: &dyn FileSystem, entry: &Path, style: OutputStyle) -> Result<String> {
    let grass_fs = GrassFs { inner: fs };
    let mut options = grass::Options::default()
        .style(style)
        .quiet(false)
        .fs(&grass_fs)
        .logger(&ScssLogger);
    if let Some(dir) = entry.parent() {
        options = options.load_path(dir);
    }

    grass::from_path(entry, &options).map_err(|e| SitepipeError::StyleCompile {
        file: entry.to_path_buf(),
        message: e.to_string(),
    })
}

/// Lets the compiler read sources through [`FileSystem`].
#[derive(Debug)]
struct GrassFs<'a> {
    inner: &'a dyn FileSystem,
}

impl grass::Fs for GrassFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner
            .read(path)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))
    }
}

/// Forwards `@debug` and `@warn` output to tracing.
#[derive(Debug)]
struct ScssLogger;

impl grass::Logger for ScssLogger {
    fn debug(&self, location: SpanLoc, message: &str) {
        debug!(
            "{}:{} DEBUG: {}",
            location.file.name(),
            location.begin.line + 1,
            message
        );
    }

    fn warn(&self, location: SpanLoc, message: &str) {
        warn!(
            "Warning: {}\n    {}:{}:{}",
            message,
            location.file.name(),
            location.begin.line + 1,
            location.begin.column + 1
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn compressed_is_smaller_than_expanded() {
        let fs = MockFileSystem::new();
        fs.add_file("./app/scss/_vars.scss", "$accent: #ff0000;\n");
        fs.add_file(
            "./app/scss/style.scss",
            "@import 'vars';\n\nbody {\n  color: $accent;\n  .inner { margin: 0; }\n}\n",
        );

        let entry = Path::new("./app/scss/style.scss");
        let expanded = compile(&fs, entry, OutputStyle::Expanded).unwrap();
        let compressed = compile(&fs, entry, OutputStyle::Compressed).unwrap();

        assert!(expanded.contains("body .inner"));
        assert!(compressed.len() < expanded.len());
        assert!(!compressed.contains("\n  "));
    }

    #[test]
    fn syntax_error_carries_file() {
        let fs = MockFileSystem::new();
        fs.add_file("./app/scss/style.scss", "body { color: ; ");

        let err = compile(&fs, Path::new("./app/scss/style.scss"), OutputStyle::Expanded)
            .unwrap_err();
        assert!(matches!(err, SitepipeError::StyleCompile { .. }));
    }
}
