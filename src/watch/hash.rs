use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::{debug, info};

use crate::fs::FileSystem;

/// Relative path (from the project root) to the hashes file.
///
/// The effective path on disk is `<root>/.sitepipe/hashes`.
pub const HASH_FILE_PATH: &str = ".sitepipe/hashes";

fn hash_file_path(root: &Path) -> PathBuf {
    root.join(HASH_FILE_PATH)
}

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs
        .read(path)
        .with_context(|| format!("hashing {}", path.display()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Aggregate hash over per-file `(path, hash)` pairs.
///
/// Paths take part so that renaming a file changes the aggregate.
pub fn compute_aggregate_hash(entries: &[(PathBuf, String)]) -> String {
    let mut hasher = Hasher::new();
    for (path, hash) in entries {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hasher.update(hash.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Storage for per-binding content hashes.
pub trait HashStore: Send + Sync + Debug {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, hash: &str) -> Result<()>;
    /// Remove hashes whose key is not in `active`.
    fn prune(&mut self, active: &[String]) -> Result<()>;
}

/// Stores hashes in `<root>/.sitepipe/hashes`, one `key hash` per line.
#[derive(Debug)]
pub struct FileHashStore {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileHashStore {
    pub fn new(root: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self { root, fs }
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>> {
        let path = hash_file_path(&self.root);
        if !self.fs.exists(&path) {
            return Ok(BTreeMap::new());
        }

        let text = self.fs.read_to_string(&path)?;
        let map = text
            .lines()
            .filter_map(|line| line.trim().split_once(char::is_whitespace))
            .map(|(key, hash)| (key.to_string(), hash.trim().to_string()))
            .collect();
        Ok(map)
    }

    fn save_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let mut text = String::new();
        for (key, hash) in map {
            text.push_str(key);
            text.push(' ');
            text.push_str(hash);
            text.push('\n');
        }
        let path = hash_file_path(&self.root);
        self.fs
            .write(&path, text.as_bytes())
            .with_context(|| format!("writing hash file at {:?}", path))
    }
}

impl HashStore for FileHashStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_all()?.get(key).cloned())
    }

    fn save(&mut self, key: &str, hash: &str) -> Result<()> {
        let mut map = self.load_all()?;
        map.insert(key.to_string(), hash.to_string());
        self.save_all(&map)?;
        debug!(key = %key, hash = %hash, "stored binding hash (file)");
        Ok(())
    }

    fn prune(&mut self, active: &[String]) -> Result<()> {
        let mut map = self.load_all()?;
        let initial = map.len();
        map.retain(|k, _| active.contains(k));
        if map.len() < initial {
            self.save_all(&map)?;
            info!(removed = initial - map.len(), "pruned stale binding hashes (file)");
        }
        Ok(())
    }
}

/// Stores hashes in memory only.
#[derive(Debug, Default)]
pub struct MemoryHashStore {
    map: BTreeMap<String, String>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashStore for MemoryHashStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn save(&mut self, key: &str, hash: &str) -> Result<()> {
        self.map.insert(key.to_string(), hash.to_string());
        debug!(key = %key, hash = %hash, "stored binding hash (memory)");
        Ok(())
    }

    fn prune(&mut self, active: &[String]) -> Result<()> {
        self.map.retain(|k, _| active.contains(k));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn file_store_round_trips_and_prunes() {
        let fs = Arc::new(MockFileSystem::new());
        let mut store = FileHashStore::new(PathBuf::from("."), fs.clone());

        store.save("styles", "aaa").unwrap();
        store.save("scripts", "bbb").unwrap();
        assert_eq!(store.load("styles").unwrap().as_deref(), Some("aaa"));

        store.prune(&["scripts".to_string()]).unwrap();
        assert_eq!(store.load("styles").unwrap(), None);

        let on_disk = fs.read_to_string(Path::new("./.sitepipe/hashes")).unwrap();
        assert_eq!(on_disk, "scripts bbb\n");
    }

    #[test]
    fn aggregate_depends_on_paths() {
        let a = compute_aggregate_hash(&[(PathBuf::from("a.scss"), "h".into())]);
        let b = compute_aggregate_hash(&[(PathBuf::from("b.scss"), "h".into())]);
        assert_ne!(a, b);
    }
}
