//! A provider that keeps documents in process memory.
//!
//! Identifiers are plain integers handed out in increasing order, starting at 1.
//! Useful whenever a test needs `create` semantics without a database.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{FactoryError, Result};
use crate::provider::{Document, Filter, Model, Provider};

#[derive(Debug, Default)]
struct Storage {
    last_id: u64,
    kept: BTreeMap<u64, Document>,
}

#[derive(Debug, Default)]
pub struct MemoryProvider {
    storage: Mutex<Storage>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|e| FactoryError::Lock(e.to_string()))
    }

    /// All stored documents of `model` matching `filter`, in identifier order.
    pub async fn find(&self, model: &Model, filter: &Filter) -> Result<Vec<Document>> {
        let storage = self.storage()?;
        Ok(storage
            .kept
            .values()
            .filter(|d| d.model() == model && filter.matches(d))
            .cloned()
            .collect())
    }

    pub async fn find_one(&self, model: &Model, filter: &Filter) -> Result<Option<Document>> {
        let storage = self.storage()?;
        Ok(storage
            .kept
            .values()
            .find(|d| d.model() == model && filter.matches(d))
            .cloned())
    }

    /// Number of documents held, across all models.
    pub fn len(&self) -> Result<usize> {
        Ok(self.storage()?.kept.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.storage()?.kept.is_empty())
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    fn create(&self, model: &Model, attributes: Map<String, Value>) -> Result<Document> {
        Ok(Document::new(model.clone(), attributes))
    }

    async fn save(&self, mut document: Document) -> Result<Document> {
        let mut storage = self.storage()?;
        let id = match document.id() {
            Some(id) => {
                if let Some(stored) = storage.kept.get(&id) {
                    if stored.model() != document.model() {
                        return Err(FactoryError::Persistence(format!(
                            "document {id} belongs to another collection than '{}'",
                            document.model()
                        )));
                    }
                }
                // fresh ids must not collide with imported ones
                storage.last_id = storage.last_id.max(id);
                id
            }
            None => {
                storage.last_id += 1;
                let id = storage.last_id;
                document.assign_id(id);
                id
            }
        };
        debug!(collection = %document.model(), id, "memory save");
        storage.kept.insert(id, document.clone());
        Ok(document)
    }

    async fn remove(&self, model: &Model, filter: &Filter) -> Result<u64> {
        let mut storage = self.storage()?;
        let before = storage.kept.len();
        storage
            .kept
            .retain(|_, d| !(d.model() == model && filter.matches(d)));
        let removed = (before - storage.kept.len()) as u64;
        debug!(collection = %model, removed, "memory remove");
        Ok(removed)
    }
}
