// src/fs/mock.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Result};

use super::FileSystem;

/// In-memory filesystem holding only files; a directory exists while some
/// file lives below it.
///
/// Keys are normalised by dropping `.` components, so `./app/x.html` and
/// `app/x.html` name the same file. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

fn key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files().insert(key(path.as_ref()), content.into());
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let found = self.files().get(&key(path)).cloned();
        match found {
            Some(bytes) => Ok(bytes),
            None if self.is_dir(path) => bail!("{} is a directory", path.display()),
            None => bail!("{} not found", path.display()),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if self.is_dir(path) {
            bail!("{} is a directory", path.display());
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files().contains_key(&key(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = key(path);
        dir.as_os_str().is_empty() || self.files().keys().any(|f| f != &dir && f.starts_with(&dir))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            bail!("{} is not a directory", path.display());
        }
        let dir = key(path);
        let children: BTreeSet<_> = self
            .files()
            .keys()
            .filter_map(|f| f.strip_prefix(&dir).ok()?.components().next())
            .map(|first| first.as_os_str().to_owned())
            .collect();
        Ok(children.into_iter().map(|name| path.join(name)).collect())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<bool> {
        if self.is_file(path) {
            bail!("{} is not a directory", path.display());
        }
        let dir = key(path);
        let mut files = self.files();
        let before = files.len();
        files.retain(|f, _| !f.starts_with(&dir));
        Ok(files.len() != before)
    }
}
