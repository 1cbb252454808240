// src/tasks/clean.rs

use tracing::info;

use super::TaskContext;
use crate::errors::Result;

/// `cleanDist`: delete the release directory. Missing is fine.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let release = ctx.layout.release_dir();
    if ctx.fs.remove_dir_all(&release)? {
        info!(path = ?release, "removed release directory");
    } else {
        info!(path = ?release, "release directory absent; nothing to clean");
    }
    Ok(())
}
