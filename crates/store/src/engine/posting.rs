//! The posting engine.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use vendra_core::document::{DocPath, ReadSet, WritePlan};
use vendra_core::ledger::{
    PhonePlacement, PlanError, SoldItem, adjustment, expense, trade, transfer,
};
use vendra_core::model::transaction::transaction_path;
use vendra_core::model::{
    AdjustmentRecord, BrandRecord, ExpenseRecord, LineItem, ModelRecord, TradeRecord, Transaction,
    TransferRecord, inventory,
};
use vendra_shared::{StoreConfig, TransactionId};

use crate::contract::DocumentStore;
use crate::engine::atomic::run_atomic;
use crate::engine::error::PostingError;
use crate::repository::{AccountRepository, InventoryRepository};

/// Posts new transactions against the books.
///
/// Posting mirrors reversal: the same planners run with the signs flipped,
/// under the same optimistic commit loop. Purchases create any brand and
/// model documents they need before entering the atomic phase; sales
/// resolve each sold phone through the IMEI index first. Expenses post as
/// plain reads followed by an unconditional batch, like their reversal.
pub struct PostingEngine {
    store: Arc<dyn DocumentStore>,
    accounts: AccountRepository,
    inventory: InventoryRepository,
    max_attempts: u32,
}

impl PostingEngine {
    /// Creates an engine that abandons a posting after `max_attempts`
    /// conflicting commit rounds.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, max_attempts: u32) -> Self {
        Self {
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

    /// Posts one transaction.
    ///
    /// # Errors
    ///
    /// [`PostingError::AlreadyPosted`] when a record with this id is
    /// already stored; [`PostingError::Plan`] when the record cannot be
    /// posted as written, such as a purchase of an already-registered IMEI;
    /// [`PostingError::ConflictRetryExhausted`] when every commit attempt
    /// lost to a concurrent writer.
    pub async fn post(&self, tx: &Transaction) -> Result<(), PostingError> {
        match tx {
            Transaction::Purchase(record) => self.post_purchase(record).await?,
            Transaction::Sale(record) => self.post_sale(record).await?,
            Transaction::CurrencyTransfer(record) => self.post_transfer(record).await?,
            Transaction::Expense(record) => self.post_expense(record).await?,
            Transaction::BalanceAdjustment(record) => self.post_adjustment(record).await?,
        }
        tracing::info!(id = %tx.id(), kind = %tx.kind(), "posted transaction");
        Ok(())
    }

    async fn post_purchase(&self, record: &TradeRecord) -> Result<(), PostingError> {
        let placements = self.prepare_placements(&record.items).await?;
        let read_plan = trade::purchase_apply_reads(record, &placements);
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_unposted(reads, record.id)?;
                trade::plan_purchase_apply(record, &placements, reads, Utc::now())
                    .map_err(PostingError::from)
            },
        )
        .await
        .map_err(PostingError::from)
    }

    async fn post_sale(&self, record: &TradeRecord) -> Result<(), PostingError> {
        let sold = self.resolve_sold(&record.items).await?;
        let read_plan = trade::sale_apply_reads(record, &sold);
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_unposted(reads, record.id)?;
                trade::plan_sale_apply(record, &sold, reads, Utc::now())
                    .map_err(PostingError::from)
            },
        )
        .await
        .map_err(PostingError::from)
    }

    async fn post_transfer(&self, record: &TransferRecord) -> Result<(), PostingError> {
        let read_plan = transfer::transfer_reads(record)?;
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_unposted(reads, record.id)?;
                transfer::plan_transfer_apply(record, reads).map_err(PostingError::from)
            },
        )
        .await
        .map_err(PostingError::from)
    }

    async fn post_expense(&self, record: &ExpenseRecord) -> Result<(), PostingError> {
        if self.store.get(&transaction_path(record.id)).await?.is_some() {
            return Err(PostingError::AlreadyPosted(record.id));
        }
        let accounts = self.accounts.snapshots().await?;
        let plan = expense::plan_expense_apply(record, &accounts, Utc::now())?;
        self.store.commit_batch(plan).await?;
        Ok(())
    }

    async fn post_adjustment(&self, record: &AdjustmentRecord) -> Result<(), PostingError> {
        let read_plan = adjustment::adjustment_reads(record)?;
        run_atomic(
            self.store.as_ref(),
            &read_plan,
            self.max_attempts,
            |reads| {
                ensure_unposted(reads, record.id)?;
                adjustment::plan_adjustment_apply(record, reads).map_err(PostingError::from)
            },
        )
        .await
        .map_err(PostingError::from)
    }

    async fn prepare_placements(
        &self,
        items: &[LineItem],
    ) -> Result<Vec<PhonePlacement>, PostingError> {
        let mut placements = Vec::with_capacity(items.len());
        for item in items {
            let brand_path = self.ensure_brand(&item.brand).await?;
            let model_path = self.ensure_model(&brand_path, &item.model).await?;
            placements.push(PhonePlacement {
                item: item.clone(),
                brand_path,
                model_path,
                phone_id: Uuid::new_v4().to_string(),
            });
        }
        Ok(placements)
    }

    async fn ensure_brand(&self, name: &str) -> Result<DocPath, PostingError> {
        if let Some((path, _)) = self.inventory.brand_by_name(name).await? {
            return Ok(path);
        }
        let path = inventory::brands().doc(Uuid::new_v4().to_string());
        let record = BrandRecord {
            name: name.to_string(),
        };
        let mut plan = WritePlan::new();
        plan.set(path.clone(), &record).map_err(PlanError::from)?;
        self.store.commit_batch(plan).await?;
        tracing::debug!(brand = name, "created brand document");
        Ok(path)
    }

    async fn ensure_model(&self, brand: &DocPath, name: &str) -> Result<DocPath, PostingError> {
        if let Some((path, _)) = self.inventory.model_by_name(brand, name).await? {
            return Ok(path);
        }
        let path = inventory::models_of(brand).doc(Uuid::new_v4().to_string());
        let record = ModelRecord {
            name: name.to_string(),
        };
        let mut plan = WritePlan::new();
        plan.set(path.clone(), &record).map_err(PlanError::from)?;
        self.store.commit_batch(plan).await?;
        tracing::debug!(model = name, "created model document");
        Ok(path)
    }

    async fn resolve_sold(&self, items: &[LineItem]) -> Result<Vec<SoldItem>, PostingError> {
        let mut sold = Vec::with_capacity(items.len());
        for item in items {
            let Some(entry) = self.inventory.imei_entry(&item.imei).await? else {
                return Err(PostingError::PhoneNotFound(item.imei.clone()));
            };
            sold.push(SoldItem {
                item: item.clone(),
                phone_path: entry.phone_path,
                imei_path: inventory::imei_path(&item.imei),
            });
        }
        Ok(sold)
    }
}

fn ensure_unposted(reads: &ReadSet, id: TransactionId) -> Result<(), PostingError> {
    if reads.exists(&transaction_path(id)) {
        Err(PostingError::AlreadyPosted(id))
    } else {
        Ok(())
    }
}
