use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{ContentStore, StoredRecord};
use crate::error::{CoreError, CoreResult};

type Collections = HashMap<String, BTreeMap<String, StoredRecord>>;

/// In-process document store.
///
/// When opened with a snapshot path, the whole dataset is loaded at start
/// and rewritten after every mutation (write to a sibling temp file, then
/// rename), so a crash never leaves a half-written snapshot behind.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty, non-persistent store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by a JSON snapshot file.
    ///
    /// A missing file starts an empty store; the file is created on the
    /// first mutation.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Io`] if the file exists but cannot be read.
    /// - [`CoreError::Serialization`] if the file is not a valid snapshot.
    pub async fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: HashMap<String, Vec<StoredRecord>> = serde_json::from_slice(&bytes)?;
                let loaded: Collections = snapshot
                    .into_iter()
                    .map(|(name, records)| {
                        let by_id = records.into_iter().map(|r| (r.id.clone(), r)).collect();
                        (name, by_id)
                    })
                    .collect();
                tracing::info!(
                    "Loaded content snapshot from {} ({} collections)",
                    path.display(),
                    loaded.len()
                );
                loaded
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No snapshot at {}, starting empty", path.display());
                Collections::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            collections: RwLock::new(collections),
            snapshot: Some(path),
        })
    }

    async fn persist(&self, collections: &Collections) -> CoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let snapshot: BTreeMap<&str, Vec<&StoredRecord>> = collections
            .iter()
            .map(|(name, records)| (name.as_str(), records.values().collect()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        write_atomic(path, &bytes).await
    }

    /// Persists `next` and only then makes it the live dataset, so a failed
    /// write leaves both memory and disk at the previous state.
    async fn commit(&self, live: &mut Collections, next: Collections) -> CoreResult<()> {
        self.persist(&next).await?;
        *live = next;
        Ok(())
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn not_found(collection: &str, id: &str) -> CoreError {
    CoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list(&self, collection: &str) -> CoreResult<Vec<StoredRecord>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> CoreResult<StoredRecord> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> CoreResult<StoredRecord> {
        let now = Utc::now();
        let record = StoredRecord {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            body,
        };

        let mut collections = self.collections.write().await;
        let mut next = collections.clone();
        next.entry(collection.to_string())
            .or_default()
            .insert(record.id.clone(), record.clone());
        self.commit(&mut collections, next).await?;

        tracing::debug!("Inserted {collection}/{}", record.id);
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        body: Map<String, Value>,
    ) -> CoreResult<StoredRecord> {
        let mut collections = self.collections.write().await;
        let mut next = collections.clone();
        let record = next
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;
        record.body = body;
        record.updated_at = Utc::now();
        let updated = record.clone();
        self.commit(&mut collections, next).await?;

        tracing::debug!("Updated {collection}/{id}");
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> CoreResult<()> {
        let mut collections = self.collections.write().await;
        let mut next = collections.clone();
        next.get_mut(collection)
            .and_then(|records| records.remove(id))
            .ok_or_else(|| not_found(collection, id))?;
        self.commit(&mut collections, next).await?;

        tracing::debug!("Deleted {collection}/{id}");
        Ok(())
    }
}
