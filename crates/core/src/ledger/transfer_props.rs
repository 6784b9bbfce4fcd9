//! Property-based tests for the transfer planners.
//!
//! Transfers are the simplest pair to state laws about: every plan is a
//! handful of currency balance sets plus one record op, so posting and
//! reversal can be checked as exact inverses over the whole document state.

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;

use vendra_shared::{Currency, EntityId, TransactionId, round_cents};

use crate::document::{DocPath, ReadPlan, ReadSet, WriteOp, WritePlan};
use crate::ledger::transfer::{plan_transfer_apply, plan_transfer_reversal, transfer_reads};
use crate::model::transaction::transaction_path;
use crate::model::{BalanceHolder, CurrencyBalances, Entity, EntityKind, TransferRecord};

/// Strategy for positive amounts with cent precision.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for either own-balance holder or one of two entities.
fn arb_holder() -> impl Strategy<Value = BalanceHolder> {
    prop_oneof![
        Just(BalanceHolder::OwnCash),
        Just(BalanceHolder::OwnBank),
        Just(BalanceHolder::Entity(EntityId::new("ent-a"))),
        Just(BalanceHolder::Entity(EntityId::new("ent-b"))),
    ]
}

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just("USD"), Just("CAD"), Just("EUR")]
        .prop_map(|name| Currency::new(name).expect("valid currency"))
}

/// Strategy for a transfer, sometimes an exchange. The received leg may
/// even use the sent currency; the laws hold regardless.
fn arb_transfer() -> impl Strategy<Value = TransferRecord> {
    (
        arb_holder(),
        arb_holder(),
        arb_currency(),
        arb_amount(),
        prop::option::of((arb_currency(), arb_amount(), arb_amount())),
    )
        .prop_map(|(giver, taker, currency, amount, exchange)| {
            let (receiving_currency, received_amount, exchange_rate) = match exchange {
                Some((currency, amount, rate)) => (Some(currency), Some(amount), Some(rate)),
                None => (None, None, None),
            };
            TransferRecord {
                id: TransactionId::new(),
                date: Utc::now(),
                amount,
                giver: Some(giver),
                taker: Some(taker),
                currency: Some(currency),
                is_exchange: receiving_currency.is_some(),
                receiving_currency,
                received_amount,
                exchange_rate,
            }
        })
}

type Docs = HashMap<DocPath, Value>;

fn put<T: serde::Serialize>(docs: &mut Docs, path: DocPath, doc: &T) {
    docs.insert(path, serde_json::to_value(doc).expect("encode fixture"));
}

/// Entity documents for the two known entity ids plus starting balances
/// for both holders.
fn seed_docs(record: &TransferRecord, start: Decimal) -> Docs {
    let mut docs = Docs::new();
    put(
        &mut docs,
        EntityKind::Customer.doc_path(&EntityId::new("ent-a")),
        &Entity::named("Ada"),
    );
    put(
        &mut docs,
        EntityKind::Supplier.doc_path(&EntityId::new("ent-b")),
        &Entity::named("North Supply"),
    );

    let mut currencies = vec![record.currency.clone().expect("currency")];
    if let Some(receiving) = &record.receiving_currency {
        currencies.push(receiving.clone());
    }
    for holder in [record.giver.as_ref(), record.taker.as_ref()] {
        let holder = holder.expect("holder");
        let mut balances = CurrencyBalances::default();
        for currency in &currencies {
            balances.add(currency, start);
        }
        docs.entry(holder.doc_path())
            .or_insert_with(|| serde_json::to_value(&balances).expect("encode fixture"));
    }
    docs
}

fn fold(docs: &mut Docs, plan: &WritePlan) {
    for op in plan.ops() {
        match op {
            WriteOp::Set { path, data } => {
                docs.insert(path.clone(), data.clone());
            }
            WriteOp::Delete { path } => {
                docs.remove(path);
            }
        }
    }
}

fn snapshot(docs: &Docs, plan: &ReadPlan) -> ReadSet {
    let mut reads = ReadSet::new();
    for path in plan.paths() {
        match docs.get(path) {
            Some(value) => reads.insert(path.clone(), 1, Some(value.clone())),
            None => reads.insert(path.clone(), 0, None),
        }
    }
    reads
}

fn balances_at(docs: &Docs, holder: &BalanceHolder) -> CurrencyBalances {
    docs.get(&holder.doc_path())
        .map(|value| serde_json::from_value(value.clone()).expect("decode balances"))
        .unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting then reversing a transfer leaves every balance document
    /// exactly where it started.
    #[test]
    fn prop_apply_then_reverse_is_identity(
        record in arb_transfer(),
        start in arb_amount(),
    ) {
        let mut docs = seed_docs(&record, start);
        let giver = record.giver.clone().unwrap();
        let taker = record.taker.clone().unwrap();
        let before_giver = balances_at(&docs, &giver);
        let before_taker = balances_at(&docs, &taker);

        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let apply = plan_transfer_apply(&record, &reads).unwrap();
        fold(&mut docs, &apply);

        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let reverse = plan_transfer_reversal(&record, &reads).unwrap();
        fold(&mut docs, &reverse);

        prop_assert_eq!(balances_at(&docs, &giver), before_giver);
        prop_assert_eq!(balances_at(&docs, &taker), before_taker);
        prop_assert!(!docs.contains_key(&transaction_path(record.id)));
    }

    /// Reversal hands the sent amount back: giver up, taker down.
    #[test]
    fn prop_reversal_moves_amount_back(
        currency in arb_currency(),
        amount in arb_amount(),
        start in arb_amount(),
    ) {
        let giver = BalanceHolder::Entity(EntityId::new("ent-a"));
        let taker = BalanceHolder::OwnCash;
        let record = TransferRecord {
            id: TransactionId::new(),
            date: Utc::now(),
            amount,
            giver: Some(giver.clone()),
            taker: Some(taker.clone()),
            currency: Some(currency.clone()),
            is_exchange: false,
            receiving_currency: None,
            received_amount: None,
            exchange_rate: None,
        };
        let mut docs = seed_docs(&record, start);

        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let plan = plan_transfer_reversal(&record, &reads).unwrap();
        fold(&mut docs, &plan);

        prop_assert_eq!(
            balances_at(&docs, &giver).amount(&currency),
            round_cents(start + amount)
        );
        prop_assert_eq!(
            balances_at(&docs, &taker).amount(&currency),
            round_cents(start - amount)
        );
    }

    /// Reversal always deletes the record, and deletes it last.
    #[test]
    fn prop_reversal_deletes_record_last(record in arb_transfer(), start in arb_amount()) {
        let docs = seed_docs(&record, start);
        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let plan = plan_transfer_reversal(&record, &reads).unwrap();

        let last = plan.ops().last().unwrap();
        prop_assert!(
            matches!(last, WriteOp::Delete { path } if *path == transaction_path(record.id)),
            "last op must be Delete of the transaction path, got {:?}",
            last
        );
    }
}

// =========================================================================
// Unit tests for edge cases
// =========================================================================

#[cfg(test)]
mod edge_case_tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exchange_between_own_accounts_round_trips() {
        let record = TransferRecord {
            id: TransactionId::new(),
            date: Utc::now(),
            amount: dec!(100),
            giver: Some(BalanceHolder::OwnCash),
            taker: Some(BalanceHolder::OwnBank),
            currency: Some(Currency::new("USD").unwrap()),
            is_exchange: true,
            receiving_currency: Some(Currency::cad()),
            received_amount: Some(dec!(137.50)),
            exchange_rate: Some(dec!(1.375)),
        };
        let mut docs = seed_docs(&record, dec!(1000));

        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let apply = plan_transfer_apply(&record, &reads).unwrap();
        fold(&mut docs, &apply);

        let usd = Currency::new("USD").unwrap();
        let cash = balances_at(&docs, &BalanceHolder::OwnCash);
        assert_eq!(cash.amount(&usd), dec!(900));
        assert_eq!(cash.amount(&Currency::cad()), dec!(1137.50));

        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let reverse = plan_transfer_reversal(&record, &reads).unwrap();
        fold(&mut docs, &reverse);

        let cash = balances_at(&docs, &BalanceHolder::OwnCash);
        assert_eq!(cash.amount(&usd), dec!(1000));
        assert_eq!(cash.amount(&Currency::cad()), dec!(1000));
    }

    #[test]
    fn test_reversal_into_missing_balance_doc_starts_from_zero() {
        let record = TransferRecord {
            id: TransactionId::new(),
            date: Utc::now(),
            amount: dec!(42),
            giver: Some(BalanceHolder::OwnBank),
            taker: Some(BalanceHolder::OwnCash),
            currency: Some(Currency::new("USD").unwrap()),
            is_exchange: false,
            receiving_currency: None,
            received_amount: None,
            exchange_rate: None,
        };

        // no seeded balance docs at all
        let docs = Docs::new();
        let reads = snapshot(&docs, &transfer_reads(&record).unwrap());
        let plan = plan_transfer_reversal(&record, &reads).unwrap();

        let mut docs = docs;
        fold(&mut docs, &plan);

        let usd = Currency::new("USD").unwrap();
        assert_eq!(
            balances_at(&docs, &BalanceHolder::OwnBank).amount(&usd),
            dec!(42)
        );
        assert_eq!(
            balances_at(&docs, &BalanceHolder::OwnCash).amount(&usd),
            dec!(-42)
        );
    }
}
