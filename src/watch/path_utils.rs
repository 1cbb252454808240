// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical paths (symlinked temp dirs on macOS
/// report `/private/var/...`). Returns `None` for paths outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let root_canon = root.canonicalize().ok()?;
    // Removed files cannot be canonicalised; their parent usually can.
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;

    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/proj"), Path::new("/proj/app/js/main.js")).as_deref(),
            Some("app/js/main.js")
        );
        assert_eq!(relative_str(Path::new("/proj"), Path::new("/elsewhere/x")), None);
    }
}
