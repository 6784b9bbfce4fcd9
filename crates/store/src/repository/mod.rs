//! Typed repositories over the raw document API.
//!
//! Repositories decode the documents the engines and the application layer
//! read most, hiding paths and raw JSON from callers. They are read
//! surfaces; every mutation goes through a planner and a commit.

pub mod accounts;
pub mod currency;
pub mod entities;
pub mod inventory;
pub mod transactions;

pub use accounts::AccountRepository;
pub use currency::CurrencyRepository;
pub use entities::{EntityDirectory, EntityRepository};
pub use inventory::InventoryRepository;
pub use transactions::TransactionRepository;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use vendra_core::document::DocPath;

use crate::contract::StoreError;

/// Failures while reading typed documents.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The store itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A document exists but does not decode as the expected shape.
    #[error("malformed document at {path}: {source}")]
    Malformed {
        /// Path of the offending document.
        path: DocPath,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

pub(crate) fn decode_doc<T: DeserializeOwned>(
    path: &DocPath,
    value: Value,
) -> Result<T, RepoError> {
    serde_json::from_value(value).map_err(|source| RepoError::Malformed {
        path: path.clone(),
        source,
    })
}
