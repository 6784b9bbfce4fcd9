//! Currency transfer planners.
//!
//! A transfer moves `amount` of `currency` from a giver to a taker; an
//! exchange adds a second leg flowing the other way in `receiving_currency`.
//! Either side may be the operator's own cash, the operator's own bank, or a
//! counterparty entity. Balances live in per-holder currency documents that
//! are created lazily, so an absent document reads as all-zero.
//!
//! Reversing a transfer hands the sent amount back to the giver and pulls it
//! back out of the taker; an exchange reversal unwinds both legs.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use rust_decimal::Decimal;
use vendra_shared::Currency;

use crate::document::{DocPath, ReadPlan, ReadSet, WritePlan};
use crate::ledger::error::PlanError;
use crate::model::transaction::transaction_path;
use crate::model::{BalanceHolder, CurrencyBalances, EntityKind, Transaction, TransferRecord};

fn required_parties(
    record: &TransferRecord,
) -> Result<(&BalanceHolder, &BalanceHolder, &Currency), PlanError> {
    let giver = record.giver.as_ref().ok_or(PlanError::MissingField("giver"))?;
    let taker = record.taker.as_ref().ok_or(PlanError::MissingField("taker"))?;
    let currency = record
        .currency
        .as_ref()
        .ok_or(PlanError::MissingField("currency"))?;
    Ok((giver, taker, currency))
}

fn exchange_leg(record: &TransferRecord) -> Result<Option<(&Currency, Decimal)>, PlanError> {
    if !record.is_exchange {
        return Ok(None);
    }
    let currency = record
        .receiving_currency
        .as_ref()
        .ok_or(PlanError::MissingField("receiving_currency"))?;
    let amount = record
        .received_amount
        .ok_or(PlanError::MissingField("received_amount"))?;
    Ok(Some((currency, amount)))
}

fn add_holder_reads(plan: &mut ReadPlan, holder: &BalanceHolder) {
    if let Some(entity_id) = holder.entity_id() {
        for kind in EntityKind::PROBE_ORDER {
            plan.add(kind.doc_path(entity_id));
        }
    }
    plan.add(holder.doc_path());
}

/// Documents a transfer reversal or posting must read: the record itself,
/// both holders' balance documents, and the entity documents needed to
/// confirm that an entity-side holder actually exists.
pub fn transfer_reads(record: &TransferRecord) -> Result<ReadPlan, PlanError> {
    let (giver, taker, _) = required_parties(record)?;
    let mut plan = ReadPlan::new();
    plan.add(transaction_path(record.id));
    add_holder_reads(&mut plan, giver);
    add_holder_reads(&mut plan, taker);
    Ok(plan)
}

fn ensure_entity_known(reads: &ReadSet, holder: &BalanceHolder) -> Result<(), PlanError> {
    let Some(entity_id) = holder.entity_id() else {
        return Ok(());
    };
    let known = EntityKind::PROBE_ORDER
        .iter()
        .any(|kind| reads.exists(&kind.doc_path(entity_id)));
    if known {
        Ok(())
    } else {
        Err(PlanError::UnknownEntity(entity_id.clone()))
    }
}

/// The balance movements that undo the transfer, giver first.
fn reversal_legs(
    record: &TransferRecord,
) -> Result<Vec<(&BalanceHolder, &Currency, Decimal)>, PlanError> {
    let (giver, taker, currency) = required_parties(record)?;
    let mut legs = vec![
        (giver, currency, record.amount),
        (taker, currency, -record.amount),
    ];
    if let Some((received_currency, received)) = exchange_leg(record)? {
        legs.push((giver, received_currency, -received));
        legs.push((taker, received_currency, received));
    }
    Ok(legs)
}

fn apply_leg(
    docs: &mut BTreeMap<DocPath, CurrencyBalances>,
    reads: &ReadSet,
    holder: &BalanceHolder,
    currency: &Currency,
    delta: Decimal,
) -> Result<(), PlanError> {
    let balances = match docs.entry(holder.doc_path()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let current = reads.decode::<CurrencyBalances>(entry.key())?.unwrap_or_default();
            entry.insert(current)
        }
    };
    balances.add(currency, delta);
    Ok(())
}

/// Folds every leg into per-document updated balances. Both holders may be
/// the same document; the deltas then land on one copy.
fn balance_docs(
    record: &TransferRecord,
    reads: &ReadSet,
    negate: bool,
) -> Result<BTreeMap<DocPath, CurrencyBalances>, PlanError> {
    let (giver, taker, _) = required_parties(record)?;
    ensure_entity_known(reads, giver)?;
    ensure_entity_known(reads, taker)?;
    let mut docs = BTreeMap::new();
    for (holder, currency, delta) in reversal_legs(record)? {
        let delta = if negate { -delta } else { delta };
        apply_leg(&mut docs, reads, holder, currency, delta)?;
    }
    Ok(docs)
}

/// Plans the reversal of a transfer: the giver gets the sent amount back,
/// the taker gives it up, exchange legs unwind the opposite way, and the
/// record itself is deleted.
pub fn plan_transfer_reversal(
    record: &TransferRecord,
    reads: &ReadSet,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    for (path, balances) in balance_docs(record, reads, false)? {
        plan.set(path, &balances)?;
    }
    plan.delete(transaction_path(record.id));
    Ok(plan)
}

/// Plans the posting of a transfer: the exact negation of the reversal,
/// plus creation of the stored record.
pub fn plan_transfer_apply(
    record: &TransferRecord,
    reads: &ReadSet,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    for (path, balances) in balance_docs(record, reads, true)? {
        plan.set(path, &balances)?;
    }
    plan.set(
        transaction_path(record.id),
        &Transaction::CurrencyTransfer(record.clone()),
    )?;
    Ok(plan)
}
