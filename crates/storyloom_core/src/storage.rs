//! Persistence port for locally cached state.
//!
//! The reconciler and the local backend never touch storage directly; they
//! go through the [`KeyValueStore`] trait so the same code runs against a
//! directory of JSON files on native targets and an in-memory map in tests.
//!
//! Keys are namespaced by feature and project, see [`keys`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, StoryloomError};

/// Storage key builders.
pub mod keys {
    /// Cached scene store for a project.
    pub fn scene_store(project_id: &str) -> String {
        format!("scene_builder_store_{}", project_id)
    }

    /// Pending one-shot seed for a project.
    pub fn scene_seed(project_id: &str) -> String {
        format!("scene_builder_seed_{}", project_id)
    }

    /// Flat scene list served by the local backend.
    pub fn scenes(project_id: &str) -> String {
        format!("scene_builder_scenes_{}", project_id)
    }

    /// Manuscript chapters served by the local backend.
    pub fn manuscript(project_id: &str) -> String {
        format!("manuscript_chapters_{}", project_id)
    }

    /// Character profiles served by the local backend.
    pub fn characters(project_id: &str) -> String {
        format!("characters_{}", project_id)
    }

    /// World facts served by the local backend.
    pub fn world_facts(project_id: &str) -> String {
        format!("world_facts_{}", project_id)
    }

    /// Project list served by the local backend.
    pub const PROJECTS: &str = "projects";
}

/// A string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any existing one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Read and deserialize a JSON value.
///
/// Unparseable values are treated as absent and logged, so a corrupted
/// cache entry never blocks loading.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("[Storage] Ignoring unreadable value for '{}': {}", key, e);
            Ok(None)
        }
    }
}

/// Serialize and write a JSON value.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// In-memory store for tests and ephemeral sessions.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder pattern).
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a directory, one `{key}.json` file per key.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Use `root` as the storage directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoryloomError::FileRead { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            StoryloomError::storage(key, format!("cannot create '{}': {}", self.root.display(), e))
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|source| StoryloomError::FileWrite { path, source })
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoryloomError::storage(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryKeyValueStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryKeyValueStore::new();
        let clone = store.clone();
        clone.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_load_json_ignores_garbage() {
        let store = MemoryKeyValueStore::new().with_entry("bad", "{{{");
        let value: Option<Vec<i64>> = load_json(&store, "bad").unwrap();
        assert!(value.is_none());

        save_json(&store, "good", &vec![1, 2]).unwrap();
        let value: Option<Vec<i64>> = load_json(&store, "good").unwrap();
        assert_eq!(value, Some(vec![1, 2]));
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("cache"));

        assert!(store.get(&keys::scene_store("novel")).unwrap().is_none());
        store.set(&keys::scene_store("novel"), "{}").unwrap();
        assert!(dir.path().join("cache/scene_builder_store_novel.json").exists());
        assert_eq!(
            store.get(&keys::scene_store("novel")).unwrap().as_deref(),
            Some("{}")
        );

        store.remove(&keys::scene_store("novel")).unwrap();
        store.remove(&keys::scene_store("novel")).unwrap();
        assert!(store.get(&keys::scene_store("novel")).unwrap().is_none());
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_file_store_unusable_root_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let store = FileKeyValueStore::new(blocker.clone());

        let err = store.set(&keys::scene_store("novel"), "{}").unwrap_err();
        match err {
            StoryloomError::Storage { key, .. } => assert_eq!(key, "scene_builder_store_novel"),
            other => panic!("expected storage error, got {}", other),
        }
    }
}
