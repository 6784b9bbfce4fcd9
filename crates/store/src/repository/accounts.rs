//! Account singleton reads.

use std::sync::Arc;

use rust_decimal::Decimal;

use vendra_core::ledger::AccountSnapshots;
use vendra_core::model::{Account, AccountKind};

use crate::contract::DocumentStore;
use crate::repository::{RepoError, decode_doc};

/// Reads the three account singletons.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn DocumentStore>,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reads one account document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn get(&self, kind: AccountKind) -> Result<Option<Account>, RepoError> {
        let path = kind.doc_path();
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(decode_doc(&path, value)?)),
            None => Ok(None),
        }
    }

    /// Current amount of one account, zero when the document is absent.
    pub async fn amount(&self, kind: AccountKind) -> Result<Decimal, RepoError> {
        Ok(self.get(kind).await?.map_or(Decimal::ZERO, |a| a.amount))
    }

    /// Plain point reads of all three accounts, for the expense path.
    pub async fn snapshots(&self) -> Result<AccountSnapshots, RepoError> {
        Ok(AccountSnapshots {
            cash: self.get(AccountKind::Cash).await?,
            bank: self.get(AccountKind::Bank).await?,
            credit_card: self.get(AccountKind::CreditCard).await?,
        })
    }
}
