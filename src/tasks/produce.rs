// src/tasks/produce.rs

use tracing::{debug, info};

use super::TaskContext;
use crate::errors::Result;
use crate::select::FileSelector;

/// `building`: copy the compiled outputs and top-level pages from the app
/// directory into the release directory, keeping paths relative to the app
/// directory. The template tree is never part of the selection.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let layout = &ctx.layout;
    let selector = FileSelector::new(&layout.release_selection())?.with_base(layout.app_rel());
    let files = selector.select(ctx.fs.as_ref(), layout.root())?;

    let release = layout.release_dir();
    for file in &files {
        let dest = release.join(&file.relative);
        debug!(from = ?file.path, to = ?dest, "copying release file");
        ctx.fs.copy(&file.path, &dest)?;
    }

    info!(count = files.len(), dest = ?release, "release files copied");
    Ok(())
}
