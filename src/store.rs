//! JSON-file backed entity collection.
//!
//! One file holds one collection as a pretty-printed JSON array. The file is
//! read lazily on first access and afterwards served from memory. Every
//! mutation rewrites the whole collection to `<path>.tmp` and renames it onto
//! the canonical path, so the file on disk is always either the old or the
//! new collection, never a torn write.
//!
//! The store does no locking of its own. It is owned by exactly one
//! [`ResourceActor`](crate::actor_framework::ResourceActor), which is what
//! serialises access to it.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

/// Anything stored in a [`JsonFileStore`] is looked up by a string identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed collection in {}: {source}", path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    fn serde(path: &Path, source: serde_json::Error) -> Self {
        Self::Serde { path: path.to_path_buf(), source }
    }
}

pub struct JsonFileStore<T> {
    path: PathBuf,
    items: Vec<T>,
    loaded: bool,
}

impl<T> JsonFileStore<T>
where
    T: Identified + Clone + Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entities in insertion order. The returned vector is a copy.
    pub async fn find_all(&mut self) -> Result<Vec<T>, StoreError> {
        self.ensure_loaded().await?;
        Ok(self.items.clone())
    }

    pub async fn find_by_id(&mut self, id: &str) -> Result<Option<T>, StoreError> {
        self.ensure_loaded().await?;
        Ok(self.items.iter().find(|item| item.id() == id).cloned())
    }

    pub async fn create(&mut self, entity: T) -> Result<T, StoreError> {
        self.ensure_loaded().await?;
        self.items.push(entity.clone());
        self.commit().await?;
        Ok(entity)
    }

    /// Replaces the entity with the given id wholesale. `None` if absent.
    pub async fn update(&mut self, id: &str, entity: T) -> Result<Option<T>, StoreError> {
        self.ensure_loaded().await?;
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        self.items[index] = entity.clone();
        self.commit().await?;
        Ok(Some(entity))
    }

    pub async fn delete(&mut self, id: &str) -> Result<Option<T>, StoreError> {
        self.ensure_loaded().await?;
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let removed = self.items.remove(index);
        self.commit().await?;
        Ok(Some(removed))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    async fn ensure_loaded(&mut self) -> Result<(), StoreError> {
        if self.loaded {
            return Ok(());
        }

        self.items = match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StoreError::serde(&self.path, e))?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        self.loaded = true;
        debug!(path = %self.path.display(), count = self.items.len(), "Collection loaded");
        Ok(())
    }

    /// Persists the in-memory collection. On failure the cache is dropped so
    /// the next access reloads the untouched file instead of serving the
    /// mutation that never reached disk.
    async fn commit(&mut self) -> Result<(), StoreError> {
        if let Err(e) = self.write_atomically().await {
            error!(
                path = %self.path.display(),
                error = %e,
                "Collection write failed, discarding cache"
            );
            self.items.clear();
            self.loaded = false;
            return Err(e);
        }
        Ok(())
    }

    async fn write_atomically(&self) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(&self.items).map_err(|e| StoreError::serde(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = self.tmp_path();
        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&tmp, e));
        }

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = self.items.len(), "Collection written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        label: String,
    }

    impl Identified for Widget {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn widget(id: &str, label: &str) -> Widget {
        Widget { id: id.into(), label: label.into() }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::<Widget>::new(dir.path().join("widgets.json"));

        assert!(store.find_all().await.unwrap().is_empty());
        assert_eq!(store.find_by_id("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_survive_a_fresh_store_on_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("widgets.json");

        let mut store = JsonFileStore::new(&path);
        store.create(widget("a", "first")).await.unwrap();
        store.create(widget("b", "second")).await.unwrap();
        store.update("a", widget("a", "renamed")).await.unwrap();

        let mut reopened = JsonFileStore::<Widget>::new(&path);
        let all = reopened.find_all().await.unwrap();
        assert_eq!(all, vec![widget("a", "renamed"), widget("b", "second")]);
        assert!(!dir.path().join("nested").join("widgets.json.tmp").exists());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("widgets.json"));
        store.create(widget("a", "first")).await.unwrap();

        assert_eq!(store.update("zzz", widget("zzz", "x")).await.unwrap(), None);
        assert_eq!(store.delete("zzz").await.unwrap(), None);

        let removed = store.delete("a").await.unwrap();
        assert_eq!(removed, Some(widget("a", "first")));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_hands_out_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("widgets.json"));
        store.create(widget("a", "first")).await.unwrap();

        let mut snapshot = store.find_all().await.unwrap();
        snapshot[0].label = "mutated".into();
        snapshot.clear();

        assert_eq!(store.find_by_id("a").await.unwrap(), Some(widget("a", "first")));
    }

    #[tokio::test]
    async fn file_is_a_pretty_printed_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        let mut store = JsonFileStore::new(&path);
        store.create(widget("a", "first")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"));
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["label"], "first");
    }

    #[tokio::test]
    async fn malformed_file_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let mut store = JsonFileStore::<Widget>::new(&path);
        assert!(matches!(store.find_all().await, Err(StoreError::Serde { .. })));
    }

    #[tokio::test]
    async fn failed_write_leaves_file_and_cache_at_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        let mut store = JsonFileStore::new(&path);
        store.create(widget("a", "first")).await.unwrap();

        // A directory squatting on the temp path makes the next write fail.
        std::fs::create_dir(dir.path().join("widgets.json.tmp")).unwrap();
        let result = store.create(widget("b", "second")).await;
        assert!(matches!(result, Err(StoreError::Io { .. })));

        assert_eq!(store.find_all().await.unwrap(), vec![widget("a", "first")]);
    }
}
