//! Entity reads and the id-to-collection lookup service.

use std::sync::Arc;

use vendra_core::model::{Entity, EntityKind};
use vendra_shared::EntityId;

use crate::contract::DocumentStore;
use crate::repository::{RepoError, decode_doc};

/// Reads customer, supplier, and middleman documents.
#[derive(Clone)]
pub struct EntityRepository {
    store: Arc<dyn DocumentStore>,
}

impl EntityRepository {
    /// Creates a new entity repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reads one entity from a known collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Entity>, RepoError> {
        let path = kind.doc_path(id);
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(decode_doc(&path, value)?)),
            None => Ok(None),
        }
    }
}

/// Resolves which collection holds an entity id.
///
/// Some stored records carry an entity id without saying whether it names a
/// customer, middleman, or supplier. The directory probes the collections in
/// that fixed order and returns the first match, which is also how the
/// planners resolve the same ambiguity inside a snapshot.
#[derive(Clone)]
pub struct EntityDirectory {
    entities: EntityRepository,
}

impl EntityDirectory {
    /// Creates a directory over the same store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            entities: EntityRepository::new(store),
        }
    }

    /// Finds the entity holding `id`, if any collection has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a probed document is malformed.
    pub async fn resolve(&self, id: &EntityId) -> Result<Option<(EntityKind, Entity)>, RepoError> {
        for kind in EntityKind::PROBE_ORDER {
            if let Some(entity) = self.entities.get(kind, id).await? {
                return Ok(Some((kind, entity)));
            }
        }
        Ok(None)
    }
}
