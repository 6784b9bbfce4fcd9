//! Purchase and sale planners.
//!
//! Purchases and sales share their balance behavior and mirror each other's
//! inventory behavior: posting a purchase creates phone and IMEI documents
//! that reversing it deletes, and posting a sale deletes documents that
//! reversing it recreates from the denormalized line items.
//!
//! Inventory lookups by name or IMEI happen before the snapshot read, so
//! planners receive the resolved targets ready-made. Placements name where
//! a phone document is to be created; removals name what is to be deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vendra_shared::round_cents;

use crate::document::{DocPath, ReadPlan, ReadSet, WritePlan};
use crate::ledger::balance::{self, TradeSide};
use crate::ledger::error::PlanError;
use crate::model::transaction::{order_number_path, transaction_path};
use crate::model::{
    Account, AccountKind, BrandRecord, Entity, EntityKind, HistoryEntry, HistoryRole, ImeiRecord,
    LineItem, ModelRecord, OrderNumberRecord, PhoneRecord, PhoneStatus, TradeRecord, Transaction,
    inventory,
};

/// Where to create a phone document, with the line item that describes it.
///
/// Used when posting a purchase and when reversing a sale; in both cases
/// the brand and model documents already exist and anchor the path.
#[derive(Debug, Clone)]
pub struct PhonePlacement {
    /// The line item carrying the phone's data.
    pub item: LineItem,
    /// The brand document the phone nests under.
    pub brand_path: DocPath,
    /// The model document the phone nests under.
    pub model_path: DocPath,
    /// Pre-minted id for the new phone document.
    pub phone_id: String,
}

/// A phone and IMEI document pair to delete when reversing a purchase.
#[derive(Debug, Clone)]
pub struct PhoneRemoval {
    /// The phone document.
    pub phone_path: DocPath,
    /// The IMEI index document.
    pub imei_path: DocPath,
}

/// A phone being sold: the caller's line item plus the resolved documents.
#[derive(Debug, Clone)]
pub struct SoldItem {
    /// The line item as the caller recorded it (IMEI and price).
    pub item: LineItem,
    /// The phone document to consume.
    pub phone_path: DocPath,
    /// The IMEI index document to consume.
    pub imei_path: DocPath,
}

fn counterparty_kind(side: TradeSide) -> EntityKind {
    match side {
        TradeSide::Purchase => EntityKind::Supplier,
        TradeSide::Sale => EntityKind::Customer,
    }
}

fn counterparty_role(side: TradeSide) -> HistoryRole {
    match side {
        TradeSide::Purchase => HistoryRole::Supplier,
        TradeSide::Sale => HistoryRole::Customer,
    }
}

fn history_entry(
    side: TradeSide,
    role: HistoryRole,
    record: &TradeRecord,
    now: DateTime<Utc>,
) -> HistoryEntry {
    let (purchase_ref, sale_ref) = match side {
        TradeSide::Purchase => (Some(record.id), None),
        TradeSide::Sale => (None, Some(record.id)),
    };
    HistoryEntry {
        role,
        purchase_ref,
        sale_ref,
        recorded_at: now,
    }
}

fn base_trade_reads(side: TradeSide, record: &TradeRecord) -> ReadPlan {
    let mut plan = ReadPlan::new();
    plan.add(transaction_path(record.id));
    plan.add(counterparty_kind(side).doc_path(&record.counterparty));
    if let Some(settlement) = &record.middleman {
        plan.add(EntityKind::Middleman.doc_path(&settlement.entity_id));
    }
    let deltas =
        balance::trade_reversal_account_deltas(side, &record.payments, record.middleman.as_ref());
    for kind in AccountKind::ALL {
        if !deltas.get(kind).is_zero() {
            plan.add(kind.doc_path());
        }
    }
    plan
}

/// Documents a purchase reversal must read.
#[must_use]
pub fn purchase_reversal_reads(record: &TradeRecord) -> ReadPlan {
    base_trade_reads(TradeSide::Purchase, record)
}

/// Documents a sale reversal must read, including the brand and model
/// documents that anchor each recreated phone.
#[must_use]
pub fn sale_reversal_reads(record: &TradeRecord, placements: &[PhonePlacement]) -> ReadPlan {
    let mut plan = base_trade_reads(TradeSide::Sale, record);
    for placement in placements {
        plan.add(placement.brand_path.clone());
        plan.add(placement.model_path.clone());
    }
    plan
}

/// Documents a purchase posting must read, including the IMEI index slots
/// it checks for collisions.
#[must_use]
pub fn purchase_apply_reads(record: &TradeRecord, placements: &[PhonePlacement]) -> ReadPlan {
    let mut plan = base_trade_reads(TradeSide::Purchase, record);
    for placement in placements {
        plan.add(inventory::imei_path(&placement.item.imei));
    }
    plan
}

/// Documents a sale posting must read, including the phones being consumed.
#[must_use]
pub fn sale_apply_reads(record: &TradeRecord, sold: &[SoldItem]) -> ReadPlan {
    let mut plan = base_trade_reads(TradeSide::Sale, record);
    for item in sold {
        plan.add(item.phone_path.clone());
    }
    plan
}

fn push_account_sets(
    plan: &mut WritePlan,
    reads: &ReadSet,
    deltas: balance::AccountDeltas,
    now: DateTime<Utc>,
) -> Result<(), PlanError> {
    for kind in AccountKind::ALL {
        let delta = deltas.get(kind);
        if delta.is_zero() {
            continue;
        }
        let current = reads
            .decode::<Account>(&kind.doc_path())?
            .map_or(Decimal::ZERO, |account| account.amount);
        let account = Account {
            amount: round_cents(current + delta),
            updated_at: now,
        };
        plan.set(kind.doc_path(), &account)?;
    }
    Ok(())
}

fn push_trade_reversal_balances(
    side: TradeSide,
    record: &TradeRecord,
    reads: &ReadSet,
    now: DateTime<Utc>,
    plan: &mut WritePlan,
) -> Result<(), PlanError> {
    let counterparty_path = counterparty_kind(side).doc_path(&record.counterparty);
    let mut counterparty: Entity = reads.require(&counterparty_path)?;
    counterparty.balance = round_cents(
        counterparty.balance + balance::counterparty_reversal_delta(side, &record.payments),
    );
    counterparty.remove_history(record.id);
    plan.set(counterparty_path, &counterparty)?;

    if let Some(settlement) = &record.middleman {
        let middleman_path = EntityKind::Middleman.doc_path(&settlement.entity_id);
        let mut middleman: Entity = reads.require(&middleman_path)?;
        let delta =
            balance::middleman_reversal_delta(side, settlement.direction, settlement.split.credit);
        middleman.balance = round_cents(middleman.balance + delta);
        middleman.remove_history(record.id);
        plan.set(middleman_path, &middleman)?;
    }

    push_account_sets(
        plan,
        reads,
        balance::trade_reversal_account_deltas(side, &record.payments, record.middleman.as_ref()),
        now,
    )
}

fn push_trade_apply_balances(
    side: TradeSide,
    record: &TradeRecord,
    reads: &ReadSet,
    now: DateTime<Utc>,
    plan: &mut WritePlan,
) -> Result<(), PlanError> {
    let counterparty_path = counterparty_kind(side).doc_path(&record.counterparty);
    let mut counterparty: Entity = reads.require(&counterparty_path)?;
    counterparty.balance = round_cents(
        counterparty.balance - balance::counterparty_reversal_delta(side, &record.payments),
    );
    counterparty.push_history(history_entry(side, counterparty_role(side), record, now));
    plan.set(counterparty_path, &counterparty)?;

    if let Some(settlement) = &record.middleman {
        let middleman_path = EntityKind::Middleman.doc_path(&settlement.entity_id);
        let mut middleman: Entity = reads.require(&middleman_path)?;
        let delta =
            balance::middleman_reversal_delta(side, settlement.direction, settlement.split.credit);
        middleman.balance = round_cents(middleman.balance - delta);
        middleman.push_history(history_entry(side, HistoryRole::Middleman, record, now));
        plan.set(middleman_path, &middleman)?;
    }

    push_account_sets(
        plan,
        reads,
        balance::trade_reversal_account_deltas(side, &record.payments, record.middleman.as_ref())
            .negated(),
        now,
    )
}

fn push_phone_creation(
    plan: &mut WritePlan,
    placement: &PhonePlacement,
    brand_name: &str,
    model_name: &str,
) -> Result<(), PlanError> {
    let phone_path = inventory::phones_of(&placement.model_path).doc(&placement.phone_id);
    let item = &placement.item;
    let phone = PhoneRecord {
        imei: item.imei.clone(),
        brand: brand_name.to_string(),
        model: model_name.to_string(),
        capacity: item.capacity,
        capacity_unit: item.capacity_unit.clone(),
        color: item.color.clone(),
        carrier: item.carrier.clone(),
        storage_location: item.storage_location.clone(),
        unit_cost: item.restored_unit_cost(),
        status: item.restored_status(),
    };
    plan.set(phone_path.clone(), &phone)?;

    let index = ImeiRecord {
        imei: item.imei.clone(),
        brand: brand_name.to_string(),
        model: model_name.to_string(),
        phone_path,
    };
    plan.set(inventory::imei_path(&item.imei), &index)?;
    Ok(())
}

fn push_trade_record_deletes(record: &TradeRecord, plan: &mut WritePlan) {
    if let Some(order) = &record.order_number {
        plan.delete(order_number_path(order.id));
    }
    plan.delete(transaction_path(record.id));
}

fn push_trade_record_creates(
    side: TradeSide,
    record: &TradeRecord,
    plan: &mut WritePlan,
) -> Result<(), PlanError> {
    if let Some(order) = &record.order_number {
        let order_record = OrderNumberRecord {
            number: order.number.clone(),
            kind: match side {
                TradeSide::Purchase => crate::model::TransactionKind::Purchase,
                TradeSide::Sale => crate::model::TransactionKind::Sale,
            },
            trade_ref: record.id,
        };
        plan.set(order_number_path(order.id), &order_record)?;
    }
    let stored = match side {
        TradeSide::Purchase => Transaction::Purchase(record.clone()),
        TradeSide::Sale => Transaction::Sale(record.clone()),
    };
    plan.set(transaction_path(record.id), &stored)?;
    Ok(())
}

/// Plans the reversal of a purchase.
///
/// Restores the supplier's balance and history, restores the middleman if
/// one was involved, puts the paid amounts back into the accounts, deletes
/// the resolved phone and IMEI documents, and deletes the record.
pub fn plan_purchase_reversal(
    record: &TradeRecord,
    removals: &[PhoneRemoval],
    reads: &ReadSet,
    now: DateTime<Utc>,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_trade_reversal_balances(TradeSide::Purchase, record, reads, now, &mut plan)?;
    for removal in removals {
        plan.delete(removal.phone_path.clone());
        plan.delete(removal.imei_path.clone());
    }
    push_trade_record_deletes(record, &mut plan);
    Ok(plan)
}

/// Plans the reversal of a sale.
///
/// Unwinds the customer's balance and history, the middleman, and the
/// accounts, then recreates one phone and IMEI document per resolved line
/// item using the canonical names from the brand and model documents, and
/// deletes the record.
pub fn plan_sale_reversal(
    record: &TradeRecord,
    placements: &[PhonePlacement],
    reads: &ReadSet,
    now: DateTime<Utc>,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_trade_reversal_balances(TradeSide::Sale, record, reads, now, &mut plan)?;
    for placement in placements {
        let brand: BrandRecord = reads.require(&placement.brand_path)?;
        let model: ModelRecord = reads.require(&placement.model_path)?;
        push_phone_creation(&mut plan, placement, &brand.name, &model.name)?;
    }
    push_trade_record_deletes(record, &mut plan);
    Ok(plan)
}

/// Plans the posting of a purchase.
///
/// Adds the unpaid portion to the supplier's balance, records history on the
/// supplier and middleman, deducts the paid amounts from the accounts,
/// creates one phone and IMEI document per placement, and stores the record
/// and its order number. Fails if any IMEI is already registered.
pub fn plan_purchase_apply(
    record: &TradeRecord,
    placements: &[PhonePlacement],
    reads: &ReadSet,
    now: DateTime<Utc>,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_trade_apply_balances(TradeSide::Purchase, record, reads, now, &mut plan)?;
    for placement in placements {
        if reads.exists(&inventory::imei_path(&placement.item.imei)) {
            return Err(PlanError::DuplicateImei(placement.item.imei.clone()));
        }
        push_phone_creation(
            &mut plan,
            placement,
            &placement.item.brand,
            &placement.item.model,
        )?;
    }
    push_trade_record_creates(TradeSide::Purchase, record, &mut plan)?;
    Ok(plan)
}

/// Plans the posting of a sale.
///
/// Adds the unpaid portion to the customer's balance, records history,
/// moves the received amounts into the accounts, deletes each sold phone
/// and its IMEI document, and stores the record with line items enriched
/// from the consumed phone documents so the sale can be reversed later.
pub fn plan_sale_apply(
    record: &TradeRecord,
    sold: &[SoldItem],
    reads: &ReadSet,
    now: DateTime<Utc>,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_trade_apply_balances(TradeSide::Sale, record, reads, now, &mut plan)?;

    let mut enriched_items = Vec::with_capacity(sold.len());
    for sold_item in sold {
        let phone: PhoneRecord = reads.require(&sold_item.phone_path)?;
        if phone.status != PhoneStatus::Active {
            return Err(PlanError::PhoneUnavailable(phone.imei.clone()));
        }
        let mut item = sold_item.item.clone();
        item.brand = phone.brand.clone();
        item.model = phone.model.clone();
        item.capacity = phone.capacity;
        item.capacity_unit = phone.capacity_unit.clone();
        item.color = phone.color.clone();
        item.carrier = phone.carrier.clone();
        item.storage_location = phone.storage_location.clone();
        item.actual_cost = Some(phone.unit_cost);
        item.status = Some(phone.status);
        enriched_items.push(item);

        plan.delete(sold_item.phone_path.clone());
        plan.delete(sold_item.imei_path.clone());
    }

    let mut stored = record.clone();
    stored.items = enriched_items;
    push_trade_record_creates(TradeSide::Sale, &stored, &mut plan)?;
    Ok(plan)
}
