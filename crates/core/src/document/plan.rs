//! Read plans, read snapshots, and write plans.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::path::DocPath;

/// The documents an operation must read before it may write.
///
/// Order is preserved and duplicates are dropped, so a plan can be built
/// incrementally without tracking what was already added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadPlan {
    paths: Vec<DocPath>,
}

impl ReadPlan {
    /// An empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document to the plan unless it is already present.
    pub fn add(&mut self, path: DocPath) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// The planned paths, in insertion order.
    #[must_use]
    pub fn paths(&self) -> &[DocPath] {
        &self.paths
    }

    /// Whether the plan contains no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// One observed document in a [`ReadSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEntry {
    /// Store version at read time. Zero means the document did not exist.
    pub version: u64,
    /// The document data, if it existed.
    pub doc: Option<Value>,
}

/// Failure while pulling a typed document out of a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A document the plan depends on does not exist.
    #[error("required document {0} does not exist")]
    Missing(DocPath),
    /// The stored data does not decode as the expected shape.
    #[error("malformed document at {path}: {source}")]
    Malformed {
        /// Path of the offending document.
        path: DocPath,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

/// Point-in-time snapshot of the documents named by a [`ReadPlan`].
///
/// Every read is recorded, including reads of absent documents, so a
/// conditional commit can verify that nothing observed has changed since.
#[derive(Debug, Clone, Default)]
pub struct ReadSet {
    entries: HashMap<DocPath, ReadEntry>,
}

impl ReadSet {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observed document.
    pub fn insert(&mut self, path: DocPath, version: u64, doc: Option<Value>) {
        self.entries.insert(path, ReadEntry { version, doc });
    }

    /// The recorded entry for a path, if that path was read at all.
    #[must_use]
    pub fn entry(&self, path: &DocPath) -> Option<&ReadEntry> {
        self.entries.get(path)
    }

    /// The raw document at a path, if it was read and existed.
    #[must_use]
    pub fn get(&self, path: &DocPath) -> Option<&Value> {
        self.entries.get(path).and_then(|entry| entry.doc.as_ref())
    }

    /// Whether a path was read and the document existed.
    #[must_use]
    pub fn exists(&self, path: &DocPath) -> bool {
        self.get(path).is_some()
    }

    /// Decodes the document at a path.
    ///
    /// Returns `Ok(None)` when the path was not read or the document did not
    /// exist.
    pub fn decode<T: DeserializeOwned>(&self, path: &DocPath) -> Result<Option<T>, SnapshotError> {
        match self.get(path) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|source| SnapshotError::Malformed {
                    path: path.clone(),
                    source,
                }),
        }
    }

    /// Decodes the document at a path, failing if it does not exist.
    pub fn require<T: DeserializeOwned>(&self, path: &DocPath) -> Result<T, SnapshotError> {
        self.decode(path)?
            .ok_or_else(|| SnapshotError::Missing(path.clone()))
    }

    /// Iterates over every recorded read.
    pub fn iter(&self) -> impl Iterator<Item = (&DocPath, &ReadEntry)> {
        self.entries.iter()
    }

    /// Number of recorded reads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single planned mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create or fully replace a document.
    Set {
        /// Target document.
        path: DocPath,
        /// Complete new document data.
        data: Value,
    },
    /// Delete a document. Deleting an absent document is a no-op.
    Delete {
        /// Target document.
        path: DocPath,
    },
}

impl WriteOp {
    /// The document this op targets.
    #[must_use]
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Set { path, .. } | Self::Delete { path } => path,
        }
    }
}

/// Ordered list of mutations to commit atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    ops: Vec<WriteOp>,
}

impl WritePlan {
    /// An empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans a set of the given document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to serialize.
    pub fn set<T: Serialize>(&mut self, path: DocPath, doc: &T) -> Result<(), serde_json::Error> {
        let data = serde_json::to_value(doc)?;
        self.ops.push(WriteOp::Set { path, data });
        Ok(())
    }

    /// Plans a set of already-encoded document data.
    pub fn set_raw(&mut self, path: DocPath, data: Value) {
        self.ops.push(WriteOp::Set { path, data });
    }

    /// Plans a delete.
    pub fn delete(&mut self, path: DocPath) {
        self.ops.push(WriteOp::Delete { path });
    }

    /// The planned ops, in order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of planned ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the plan contains no ops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
