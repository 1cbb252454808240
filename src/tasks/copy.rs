// src/tasks/copy.rs

use tracing::info;

use super::TaskContext;
use crate::errors::Result;
use crate::select::FileSelector;

/// `copyImages`: mirror `<app>/img/**` into `<release>/img/` byte for byte.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let layout = &ctx.layout;
    let images = FileSelector::new(&[layout.images_glob()])?.select(ctx.fs.as_ref(), layout.root())?;

    let dest_dir = layout.release_dir().join("img");
    for image in &images {
        ctx.fs.copy(&image.path, &dest_dir.join(&image.relative))?;
    }

    info!(count = images.len(), dest = ?dest_dir, "images copied");
    Ok(())
}
