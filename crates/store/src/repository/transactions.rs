//! Posted transaction reads.

use std::sync::Arc;

use vendra_core::model::transaction::transaction_path;
use vendra_core::model::{Transaction, TransactionKind};
use vendra_shared::TransactionId;

use crate::contract::DocumentStore;
use crate::repository::{RepoError, decode_doc};

/// Reads posted transaction records.
#[derive(Clone)]
pub struct TransactionRepository {
    store: Arc<dyn DocumentStore>,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reads one transaction record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError> {
        let path = transaction_path(id);
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(decode_doc(&path, value)?)),
            None => Ok(None),
        }
    }

    /// Reads a transaction only when it is stored under the given kind tag.
    ///
    /// A record whose stored tag differs reads as absent, the same as a
    /// record that was never posted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn get_of_kind(
        &self,
        id: TransactionId,
        kind: TransactionKind,
    ) -> Result<Option<Transaction>, RepoError> {
        Ok(self.get(id).await?.filter(|tx| tx.kind() == kind))
    }
}
