//! Engine failure taxonomy.

use thiserror::Error;

use vendra_core::document::{DocPath, SnapshotError};
use vendra_core::ledger::PlanError;
use vendra_core::model::Imei;
use vendra_core::model::transaction::transaction_path;
use vendra_shared::{EntityId, TransactionId};

use crate::contract::StoreError;
use crate::engine::atomic::AtomicError;
use crate::repository::RepoError;

/// Failure while reversing a posted transaction.
#[derive(Debug, Error)]
pub enum ReversalError {
    /// No transaction matches the requested id and kind. Reversing the same
    /// record twice lands here the second time.
    #[error("transaction {0} does not exist")]
    NotFound(TransactionId),
    /// A document the reversal depends on no longer exists.
    #[error("required document {0} does not exist")]
    MissingDocument(DocPath),
    /// No entity collection holds the id the record references.
    #[error("no entity found for id {0}")]
    UnknownEntity(EntityId),
    /// The stored record cannot be reversed as written.
    #[error("record is not reversible: {0}")]
    InvalidData(#[source] PlanError),
    /// Every commit attempt collided with concurrent writers.
    #[error("gave up after {attempts} conflicting commit attempts")]
    ConflictRetryExhausted {
        /// How many rounds were tried.
        attempts: u32,
    },
    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReversalError {
    /// Maps a planner failure for the reversal of transaction `id`. A
    /// missing transaction document means the record itself is gone, which
    /// reads as not-found rather than a broken dependency.
    pub(crate) fn from_plan(id: TransactionId, err: PlanError) -> Self {
        match err {
            PlanError::Snapshot(SnapshotError::Missing(path)) => {
                if path == transaction_path(id) {
                    Self::NotFound(id)
                } else {
                    Self::MissingDocument(path)
                }
            }
            PlanError::UnknownEntity(entity) => Self::UnknownEntity(entity),
            other => Self::InvalidData(other),
        }
    }

    pub(crate) fn from_atomic(id: TransactionId, err: AtomicError<PlanError>) -> Self {
        match err {
            AtomicError::Build(plan) => Self::from_plan(id, plan),
            AtomicError::Store(store) => Self::Store(store),
            AtomicError::RetriesExhausted(attempts) => Self::ConflictRetryExhausted { attempts },
        }
    }
}

impl From<RepoError> for ReversalError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Store(store) => Self::Store(store),
            RepoError::Malformed { path, source } => {
                Self::InvalidData(PlanError::Snapshot(SnapshotError::Malformed { path, source }))
            }
        }
    }
}

/// Failure while posting a new transaction.
#[derive(Debug, Error)]
pub enum PostingError {
    /// A transaction with this id is already stored.
    #[error("transaction {0} is already posted")]
    AlreadyPosted(TransactionId),
    /// No phone is registered under an IMEI the sale names.
    #[error("no phone is registered for imei {0}")]
    PhoneNotFound(Imei),
    /// The record cannot be posted as written.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Every commit attempt collided with concurrent writers.
    #[error("gave up after {attempts} conflicting commit attempts")]
    ConflictRetryExhausted {
        /// How many rounds were tried.
        attempts: u32,
    },
    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AtomicError<PostingError>> for PostingError {
    fn from(err: AtomicError<PostingError>) -> Self {
        match err {
            AtomicError::Build(inner) => inner,
            AtomicError::Store(store) => Self::Store(store),
            AtomicError::RetriesExhausted(attempts) => Self::ConflictRetryExhausted { attempts },
        }
    }
}

impl From<RepoError> for PostingError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Store(store) => Self::Store(store),
            RepoError::Malformed { path, source } => {
                Self::Plan(PlanError::Snapshot(SnapshotError::Malformed { path, source }))
            }
        }
    }
}
