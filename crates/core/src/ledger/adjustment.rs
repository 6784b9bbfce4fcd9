//! Balance adjustment planners.
//!
//! An adjustment nudges one entity balance by a signed amount, either the
//! CAD balance field on the entity document or one named entry in the
//! entity's currency balances. Reversal adds the negated adjustment amount
//! to the balance as it stands now; it does not restore the recorded
//! initial balance, so a balance that moved in the meantime keeps that
//! movement.
//!
//! Records that never captured an entity id cannot be reversed and are
//! rejected as invalid.

use rust_decimal::Decimal;
use vendra_shared::{EntityId, round_cents};

use crate::document::{DocPath, ReadPlan, ReadSet, WritePlan};
use crate::ledger::error::PlanError;
use crate::model::transaction::transaction_path;
use crate::model::{
    AdjustmentRecord, BalanceHolder, CurrencyBalances, Entity, EntityKind, Transaction,
};

fn required_entity(record: &AdjustmentRecord) -> Result<&EntityId, PlanError> {
    record
        .entity_id
        .as_ref()
        .ok_or(PlanError::MissingField("entity_id"))
}

/// Documents an adjustment reversal or posting must read. When the record
/// does not say which collection holds the entity, every candidate is read
/// so the planner can probe the snapshot.
pub fn adjustment_reads(record: &AdjustmentRecord) -> Result<ReadPlan, PlanError> {
    let entity_id = required_entity(record)?;
    let mut plan = ReadPlan::new();
    plan.add(transaction_path(record.id));
    match record.entity_kind {
        Some(kind) => plan.add(kind.doc_path(entity_id)),
        None => {
            for kind in EntityKind::PROBE_ORDER {
                plan.add(kind.doc_path(entity_id));
            }
        }
    }
    if !record.currency.is_cad() {
        plan.add(BalanceHolder::Entity(entity_id.clone()).doc_path());
    }
    Ok(plan)
}

fn resolve_entity_path(
    record: &AdjustmentRecord,
    reads: &ReadSet,
) -> Result<DocPath, PlanError> {
    let entity_id = required_entity(record)?;
    if let Some(kind) = record.entity_kind {
        return Ok(kind.doc_path(entity_id));
    }
    EntityKind::PROBE_ORDER
        .iter()
        .map(|kind| kind.doc_path(entity_id))
        .find(|path| reads.exists(path))
        .ok_or_else(|| PlanError::UnknownEntity(entity_id.clone()))
}

/// Applies a signed delta to the adjusted balance and returns the balance
/// before and after.
fn push_balance_delta(
    record: &AdjustmentRecord,
    reads: &ReadSet,
    delta: Decimal,
    plan: &mut WritePlan,
) -> Result<(Decimal, Decimal), PlanError> {
    let entity_path = resolve_entity_path(record, reads)?;
    let mut entity: Entity = reads.require(&entity_path)?;
    if record.currency.is_cad() {
        let current = entity.balance;
        entity.balance = round_cents(current + delta);
        let updated = entity.balance;
        plan.set(entity_path, &entity)?;
        return Ok((current, updated));
    }
    let holder = BalanceHolder::Entity(required_entity(record)?.clone());
    let mut balances = reads
        .decode::<CurrencyBalances>(&holder.doc_path())?
        .unwrap_or_default();
    let current = balances.amount(&record.currency);
    balances.add(&record.currency, delta);
    let updated = balances.amount(&record.currency);
    plan.set(holder.doc_path(), &balances)?;
    Ok((current, updated))
}

/// Plans the reversal of an adjustment: the negated adjustment amount is
/// added to the current balance and the record is deleted.
pub fn plan_adjustment_reversal(
    record: &AdjustmentRecord,
    reads: &ReadSet,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_balance_delta(record, reads, -record.adjustment_amount, &mut plan)?;
    plan.delete(transaction_path(record.id));
    Ok(plan)
}

/// Plans the posting of an adjustment: the adjustment amount is added to
/// the current balance and the stored record captures the balance observed
/// before and after.
pub fn plan_adjustment_apply(
    record: &AdjustmentRecord,
    reads: &ReadSet,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    let (current, updated) =
        push_balance_delta(record, reads, record.adjustment_amount, &mut plan)?;
    let mut stored = record.clone();
    stored.amount = record.adjustment_amount;
    stored.initial_balance = current;
    stored.final_balance = updated;
    plan.set(
        transaction_path(record.id),
        &Transaction::BalanceAdjustment(stored),
    )?;
    Ok(plan)
}
