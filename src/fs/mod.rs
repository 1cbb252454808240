// src/fs/mod.rs

//! Filesystem seam used by tasks, the file selector and watch hashing.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

pub trait FileSystem: Send + Sync + Debug {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
    }

    /// Replace the file at `path`. Missing parent directories are created.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    /// Direct children of `path`, joined onto `path`. Order is unspecified.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Delete `path` and everything below it. `Ok(false)` when it did not
    /// exist.
    fn remove_dir_all(&self, path: &Path) -> Result<bool>;

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let bytes = self.read(from)?;
        self.write(to, &bytes)
    }
}

/// `std::fs` backed implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display())),
        _ => Ok(()),
    }
}

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        create_parent(path)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        std::fs::read_dir(path)
            .with_context(|| format!("listing {}", path.display()))?
            .map(|entry| entry.map(|e| e.path()).map_err(Into::into))
            .collect()
    }

    fn remove_dir_all(&self, path: &Path) -> Result<bool> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        create_parent(to)?;
        std::fs::copy(from, to)
            .map(drop)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))
    }
}
