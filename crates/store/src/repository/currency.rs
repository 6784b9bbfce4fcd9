//! Currency balance reads.

use std::sync::Arc;

use rust_decimal::Decimal;

use vendra_core::model::{BalanceHolder, CurrencyBalances};
use vendra_shared::Currency;

use crate::contract::DocumentStore;
use crate::repository::{RepoError, decode_doc};

/// Reads per-holder currency balance documents.
#[derive(Clone)]
pub struct CurrencyRepository {
    store: Arc<dyn DocumentStore>,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reads a holder's balances. Balance documents are created lazily,
    /// so an absent document reads as all-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn balances(&self, holder: &BalanceHolder) -> Result<CurrencyBalances, RepoError> {
        let path = holder.doc_path();
        match self.store.get(&path).await? {
            Some(value) => decode_doc(&path, value),
            None => Ok(CurrencyBalances::default()),
        }
    }

    /// One holder's balance in one currency.
    pub async fn amount(
        &self,
        holder: &BalanceHolder,
        currency: &Currency,
    ) -> Result<Decimal, RepoError> {
        Ok(self.balances(holder).await?.amount(currency))
    }
}
