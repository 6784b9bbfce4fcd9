//! In-memory document store backend.
//!
//! Backs the hermetic test suites and local development. One lock guards
//! both the documents and the per-path version high-water marks, so a
//! snapshot read observes a single consistent state.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;

use vendra_core::document::{CollectionPath, DocPath, ReadPlan, ReadSet, WriteOp, WritePlan};

use crate::contract::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
struct StoredDoc {
    data: Value,
    version: u64,
}

#[derive(Debug, Default)]
struct Inner {
    docs: HashMap<DocPath, StoredDoc>,
    /// Highest version ever assigned per path. Never reset, even when the
    /// document is deleted, so a recreated document can never reuse a
    /// version some reader already observed.
    high_water: HashMap<DocPath, u64>,
}

impl Inner {
    fn version_of(&self, path: &DocPath) -> u64 {
        self.docs.get(path).map_or(0, |doc| doc.version)
    }

    fn apply(&mut self, plan: &WritePlan) {
        for op in plan.ops() {
            match op {
                WriteOp::Set { path, data } => {
                    let next = self.high_water.get(path).copied().unwrap_or(0) + 1;
                    self.high_water.insert(path.clone(), next);
                    self.docs.insert(
                        path.clone(),
                        StoredDoc {
                            data: data.clone(),
                            version: next,
                        },
                    );
                }
                WriteOp::Delete { path } => {
                    self.docs.remove(path);
                }
            }
        }
    }
}

/// An in-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        let inner = self.read_guard()?;
        Ok(inner.docs.get(path).map(|doc| doc.data.clone()))
    }

    async fn find_by_field(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(DocPath, Value)>, StoreError> {
        let inner = self.read_guard()?;
        let mut found: Vec<(DocPath, Value)> = inner
            .docs
            .iter()
            .filter(|(path, doc)| path.is_in(collection) && doc.data.get(field) == Some(value))
            .map(|(path, doc)| (path.clone(), doc.data.clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    async fn read_set(&self, plan: &ReadPlan) -> Result<ReadSet, StoreError> {
        let inner = self.read_guard()?;
        let mut reads = ReadSet::new();
        for path in plan.paths() {
            match inner.docs.get(path) {
                Some(doc) => reads.insert(path.clone(), doc.version, Some(doc.data.clone())),
                None => reads.insert(path.clone(), 0, None),
            }
        }
        Ok(reads)
    }

    async fn commit(&self, reads: &ReadSet, plan: WritePlan) -> Result<(), StoreError> {
        let mut inner = self.write_guard()?;
        for (path, entry) in reads.iter() {
            if inner.version_of(path) != entry.version {
                return Err(StoreError::Conflict(path.clone()));
            }
        }
        inner.apply(&plan);
        Ok(())
    }

    async fn commit_batch(&self, plan: WritePlan) -> Result<(), StoreError> {
        let mut inner = self.write_guard()?;
        inner.apply(&plan);
        Ok(())
    }
}
