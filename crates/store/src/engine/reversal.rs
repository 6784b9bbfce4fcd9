//! The reversal engine.

use std::sync::Arc;

use chrono::Utc;

use vendra_core::document::{ReadSet, SnapshotError};
use vendra_core::ledger::{PlanError, adjustment, expense, trade, transfer};
use vendra_core::model::transaction::transaction_path;
use vendra_core::model::{
    AdjustmentRecord, ExpenseRecord, TradeRecord, Transaction, TransactionKind, TransferRecord,
};
use vendra_shared::{StoreConfig, TransactionId};

use crate::contract::DocumentStore;
use crate::engine::atomic::run_atomic;
use crate::engine::error::ReversalError;
use crate::engine::prefetch;
use crate::repository::{AccountRepository, InventoryRepository, TransactionRepository};

/// Reverses posted transactions.
///
/// A reversal loads the stored record, resolves inventory references
/// outside the atomic phase, then runs the matching planner under the
/// optimistic commit loop: every document the write plan touches is in the
/// snapshot, and the commit lands only if none of them changed since.
/// Expense reversals are the exception and run as plain reads followed by
/// an unconditional batch.
pub struct ReversalEngine {
    store: Arc<dyn DocumentStore>,
    transactions: TransactionRepository,
    accounts: AccountRepository,
    inventory: InventoryRepository,
    max_attempts: u32,
}

impl ReversalEngine {
    /// Creates an engine that abandons a reversal after `max_attempts`
    /// conflicting commit rounds.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, max_attempts: u32) -> Self {
        Self {
            transactions: TransactionRepository::new(Arc::clone(&store)),
            accounts: AccountRepository::new(Arc::clone(&store)),
            inventory: InventoryRepository::new(Arc::clone(&store)),
            store,
            max_attempts,
        }
    }

    /// Creates an engine with the attempt budget taken from the store
    /// configuration.
    #[must_use]
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &StoreConfig) -> Self {
        Self::new(store, config.max_commit_attempts)
    }

    /// Reverses the transaction stored under `id` and `kind`.
    ///
    /// # Errors
    ///
    /// [`ReversalError::NotFound`] when no record matches the id and kind,
    /// including a record already reversed; [`ReversalError::InvalidData`]
    /// when the stored record cannot be reversed as written;
    /// [`ReversalError::ConflictRetryExhausted`] when every commit attempt
    /// lost to a concurrent writer.
    pub async fn reverse(
        &self,
        id: TransactionId,
        kind: TransactionKind,
    ) -> Result<(), ReversalError> {
        let Some(tx) = self.transactions.get_of_kind(id, kind).await? else {
            return Err(ReversalError::NotFound(id));
        };
        match &tx {
            Transaction::Purchase(record) => self.reverse_purchase(record).await?,
            Transaction::Sale(record) => self.reverse_sale(record).await?,
            Transaction::CurrencyTransfer(record) => self.reverse_transfer(record).await?,
            Transaction::Expense(record) => self.reverse_expense(record).await?,
            Transaction::BalanceAdjustment(record) => self.reverse_adjustment(record).await?,
        }
        tracing::info!(%id, %kind, "reversed transaction");
        Ok(())
    }

    async fn reverse_purchase(&self, record: &TradeRecord) -> Result<(), ReversalError> {
        let removals = prefetch::removals(&self.inventory, &record.items).await?;
        let read_plan = trade::purchase_reversal_reads(record);
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_still_recorded(reads, record.id)?;
                trade::plan_purchase_reversal(record, &removals, reads, Utc::now())
            },
        )
        .await
        .map_err(|err| ReversalError::from_atomic(record.id, err))
    }

    async fn reverse_sale(&self, record: &TradeRecord) -> Result<(), ReversalError> {
        let placements = prefetch::placements(&self.inventory, &record.items).await?;
        let read_plan = trade::sale_reversal_reads(record, &placements);
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_still_recorded(reads, record.id)?;
                trade::plan_sale_reversal(record, &placements, reads, Utc::now())
            },
        )
        .await
        .map_err(|err| ReversalError::from_atomic(record.id, err))
    }

    async fn reverse_transfer(&self, record: &TransferRecord) -> Result<(), ReversalError> {
        let read_plan = transfer::transfer_reads(record)
            .map_err(|err| ReversalError::from_plan(record.id, err))?;
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_still_recorded(reads, record.id)?;
                transfer::plan_transfer_reversal(record, reads)
            },
        )
        .await
        .map_err(|err| ReversalError::from_atomic(record.id, err))
    }

    async fn reverse_expense(&self, record: &ExpenseRecord) -> Result<(), ReversalError> {
        let accounts = self.accounts.snapshots().await?;
        let plan = expense::plan_expense_reversal(record, &accounts, Utc::now())
            .map_err(|err| ReversalError::from_plan(record.id, err))?;
        self.store.commit_batch(plan).await?;
        Ok(())
    }

    async fn reverse_adjustment(&self, record: &AdjustmentRecord) -> Result<(), ReversalError> {
        let read_plan = adjustment::adjustment_reads(record)
            .map_err(|err| ReversalError::from_plan(record.id, err))?;
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_still_recorded(reads, record.id)?;
                adjustment::plan_adjustment_reversal(record, reads)
            },
        )
        .await
        .map_err(|err| ReversalError::from_atomic(record.id, err))
    }
}

/// A concurrent reversal may delete the record between the initial load and
/// a retry's snapshot; the plan must abort instead of unwinding twice.
fn ensure_still_recorded(reads: &ReadSet, id: TransactionId) -> Result<(), PlanError> {
    let path = transaction_path(id);
    if reads.exists(&path) {
        Ok(())
    } else {
        Err(PlanError::Snapshot(SnapshotError::Missing(path)))
    }
}
