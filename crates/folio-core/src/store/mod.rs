//! Document storage.
//!
//! [`ContentStore`] is the untyped seam the web layer talks to; it stores
//! JSON objects under a collection name. [`Collection`] layers typed access,
//! validation and display ordering on top of any store.

mod collection;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreResult;

pub use collection::Collection;
pub use memory::MemoryStore;

/// A record as held by a store: metadata plus the raw document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

/// Persistence backend for content collections.
///
/// Implementations assign ids and timestamps; bodies are opaque JSON objects.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All records of a collection, in no particular order.
    async fn list(&self, collection: &str) -> CoreResult<Vec<StoredRecord>>;

    async fn get(&self, collection: &str, id: &str) -> CoreResult<StoredRecord>;

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> CoreResult<StoredRecord>;

    /// Replaces the body of an existing record, keeping `created_at`.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        body: Map<String, Value>,
    ) -> CoreResult<StoredRecord>;

    async fn delete(&self, collection: &str, id: &str) -> CoreResult<()>;
}
