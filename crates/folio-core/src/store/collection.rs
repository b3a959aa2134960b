use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{ContentStore, StoredRecord};
use crate::content::{Document, Record};
use crate::error::{CoreError, CoreResult};

/// Typed view over one collection of a [`ContentStore`].
///
/// Validates documents before they reach the store and returns lists in
/// display order (`order` ascending, then oldest first).
pub struct Collection<T> {
    store: Arc<dyn ContentStore>,
    _doc: PhantomData<fn() -> T>,
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            _doc: PhantomData,
        }
    }

    pub async fn list(&self) -> CoreResult<Vec<Record<T>>> {
        let mut records = self
            .store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect::<CoreResult<Vec<Record<T>>>>()?;
        records.sort_by(|a, b| {
            a.data
                .order()
                .cmp(&b.data.order())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> CoreResult<Record<T>> {
        decode(self.store.get(T::COLLECTION, id).await?)
    }

    /// # Errors
    ///
    /// [`CoreError::Validation`] if the document breaks its rules; nothing is stored.
    pub async fn create(&self, doc: T) -> CoreResult<Record<T>> {
        doc.check()?;
        let stored = self.store.insert(T::COLLECTION, encode(&doc)?).await?;
        decode(stored)
    }

    /// Replaces the document stored under `id`.
    pub async fn update(&self, id: &str, doc: T) -> CoreResult<Record<T>> {
        doc.check()?;
        let stored = self.store.update(T::COLLECTION, id, encode(&doc)?).await?;
        decode(stored)
    }

    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        self.store.delete(T::COLLECTION, id).await
    }
}

fn encode<T: Document>(doc: &T) -> CoreResult<Map<String, Value>> {
    match serde_json::to_value(doc)? {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Validation(format!(
            "{} document must be an object, got {other}",
            T::COLLECTION
        ))),
    }
}

fn decode<T: Document>(record: StoredRecord) -> CoreResult<Record<T>> {
    Ok(serde_json::from_value(serde_json::to_value(record)?)?)
}
