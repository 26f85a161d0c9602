//! In-memory `RuleStorage` backend.
//!
//! Documents are held in their encoded JSON form, so everything written
//! goes through the same codec a durable backend would use. Useful for
//! tests and for callers that only need rules for the life of a process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use sift_interchange::RuleDocument;

use crate::error::StorageError;
use crate::traits::RuleStorage;

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    documents: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::EmptyKey);
    }
    Ok(())
}

#[async_trait]
impl RuleStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<RuleDocument>, StorageError> {
        check_key(key)?;
        let documents = self.documents.read().await;
        let Some(encoded) = documents.get(key) else {
            debug!(key, "rule document not found");
            return Ok(None);
        };
        let doc = sift_interchange::from_str(encoded).map_err(|e| StorageError::codec(key, e))?;
        debug!(key, kind = doc.kind(), "loaded rule document");
        Ok(Some(doc))
    }

    async fn set(&self, key: &str, doc: &RuleDocument) -> Result<(), StorageError> {
        check_key(key)?;
        let encoded = doc
            .to_json_string()
            .map_err(|e| StorageError::codec(key, e))?;
        let previous = self
            .documents
            .write()
            .await
            .insert(key.to_string(), encoded);
        debug!(
            key,
            kind = doc.kind(),
            replaced = previous.is_some(),
            "stored rule document"
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        check_key(key)?;
        let removed = self.documents.write().await.remove(key).is_some();
        debug!(key, removed, "removed rule document");
        Ok(removed)
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
