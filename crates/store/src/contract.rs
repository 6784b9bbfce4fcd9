//! The document store contract.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use vendra_core::document::{CollectionPath, DocPath, ReadPlan, ReadSet, WritePlan};

/// Failures surfaced by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional commit found that a document changed after it was read.
    #[error("document {0} changed since it was read")]
    Conflict(DocPath),
    /// The backend itself failed.
    #[error("store backend: {0}")]
    Backend(String),
}

/// A document-oriented store with versioned reads and atomic commits.
///
/// The conditional commit path enforces an all-reads-before-writes
/// discipline: callers first take a [`ReadSet`] snapshot of every document
/// a decision depends on, then submit a [`WritePlan`] that only commits if
/// none of those documents changed in between. Readers of absent documents
/// are protected too; creating a document a committer read as absent is a
/// conflict.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document.
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    /// Finds documents in one collection whose top-level `field` equals
    /// `value`. This query runs outside any snapshot; results can be stale
    /// by the time a commit built from them lands.
    async fn find_by_field(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(DocPath, Value)>, StoreError>;

    /// Takes a consistent versioned snapshot of every planned path.
    /// Absent documents are recorded at version zero.
    async fn read_set(&self, plan: &ReadPlan) -> Result<ReadSet, StoreError>;

    /// Commits a write plan atomically, but only if every document in
    /// `reads` still has the version recorded there.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] naming the first changed document.
    async fn commit(&self, reads: &ReadSet, plan: WritePlan) -> Result<(), StoreError>;

    /// Commits a write plan atomically with no read validation.
    async fn commit_batch(&self, plan: WritePlan) -> Result<(), StoreError>;
}
