use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;
use crate::id::RealmId;

/// Durable home for serialized worlds, one blob per realm.
#[async_trait]
pub trait WorldStore: Send + Sync {
    async fn save(&self, realm: &RealmId, blob: &str) -> Result<(), StoreError>;
    async fn load(&self, realm: &RealmId) -> Result<Option<String>, StoreError>;
}

/// Process-local store. Worlds do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<RealmId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorldStore for MemoryStore {
    async fn save(&self, realm: &RealmId, blob: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(realm.clone(), blob.to_string());
        Ok(())
    }

    async fn load(&self, realm: &RealmId) -> Result<Option<String>, StoreError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(realm).cloned())
    }
}

/// One `<realm>.json` file per realm under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, realm: &RealmId) -> PathBuf {
        self.dir.join(format!("{realm}.json"))
    }
}

#[async_trait]
impl WorldStore for FileStore {
    /// Writes beside the target and renames, so a crash mid-write leaves the
    /// previous snapshot intact.
    async fn save(&self, realm: &RealmId, blob: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(realm);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), bytes = blob.len(), "snapshot written");
        Ok(())
    }

    async fn load(&self, realm: &RealmId) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path(realm)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
