// src/tasks/scripts.rs

use minify_js::{Session, TopLevelMode};
use tracing::info;

use super::TaskContext;
use crate::config::layout::{SCRIPT_BUNDLE, SCRIPT_ENTRY};
use crate::errors::{Result, SitepipeError};
use crate::select::FileSelector;

/// `scripts`: concatenate the entry script into the bundle, minify it and
/// overwrite `<app>/js/main.min.js`.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let layout = &ctx.layout;
    let sources = FileSelector::new(&[layout.app_pattern(SCRIPT_ENTRY)])?
        .select(ctx.fs.as_ref(), layout.root())?;

    let mut bundle = Vec::new();
    for source in &sources {
        if !bundle.is_empty() {
            bundle.push(b'\n');
        }
        bundle.extend(ctx.fs.read(&source.path)?);
    }

    let dest = layout.app_path(SCRIPT_BUNDLE);
    let minified = minify(&bundle).map_err(|message| SitepipeError::ScriptMinify {
        file: layout.app_path(SCRIPT_ENTRY),
        message,
    })?;

    ctx.fs.write(&dest, &minified)?;
    info!(path = ?dest, bytes_in = bundle.len(), bytes_out = minified.len(), "script bundle written");

    ctx.reload.notify_changed(SCRIPT_BUNDLE);
    Ok(())
}

/// Minify a script as a classic (non-module) top-level program.
pub fn minify(source: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let session = Session::new();
    let mut out = Vec::new();
    minify_js::minify(&session, TopLevelMode::Global, source, &mut out).map_err(|e| e.to_string())?;
    Ok(out)
}
