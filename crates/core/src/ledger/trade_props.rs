//! Property-based tests for the purchase and sale planners.
//!
//! The central law under test: posting a trade and then reversing it
//! returns every touched balance and inventory document to its starting
//! value, to cent precision.

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;

use vendra_shared::{EntityId, TransactionId, round_cents};

use crate::document::{DocPath, ReadPlan, ReadSet, WriteOp, WritePlan};
use crate::ledger::balance::TradeSide;
use crate::ledger::trade::{
    plan_purchase_apply, plan_purchase_reversal, plan_sale_apply, plan_sale_reversal,
    purchase_apply_reads, purchase_reversal_reads, sale_apply_reads, sale_reversal_reads,
};
use crate::model::transaction::transaction_path;
use crate::model::{
    Account, AccountKind, Entity, EntityKind, HistoryEntry, HistoryRole, MiddlemanSettlement,
    PaymentBreakdown, PaymentSplit, SettlementDirection, TradeRecord,
};

/// Strategy for amounts with cent precision.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a payment breakdown whose total matches its parts.
fn arb_payments() -> impl Strategy<Value = PaymentBreakdown> {
    (arb_amount(), arb_amount(), arb_amount(), arb_amount()).prop_map(
        |(cash, bank, credit_card, remaining_credit)| PaymentBreakdown {
            cash,
            bank,
            credit_card,
            total_paid: cash + bank + credit_card,
            remaining_credit,
        },
    )
}

fn arb_direction() -> impl Strategy<Value = SettlementDirection> {
    prop_oneof![
        Just(SettlementDirection::Give),
        Just(SettlementDirection::Receive),
    ]
}

/// Strategy for an optional middleman settlement.
fn arb_middleman() -> impl Strategy<Value = Option<MiddlemanSettlement>> {
    prop::option::of(
        (arb_amount(), arb_amount(), arb_amount(), arb_amount(), arb_direction()).prop_map(
            |(cash, bank, credit_card, credit, direction)| MiddlemanSettlement {
                entity_id: EntityId::new("mm-1"),
                direction,
                split: PaymentSplit {
                    cash,
                    bank,
                    credit_card,
                    credit,
                },
            },
        ),
    )
}

fn arb_side() -> impl Strategy<Value = TradeSide> {
    prop_oneof![Just(TradeSide::Purchase), Just(TradeSide::Sale)]
}

/// Strategy for a trade record with no line items; inventory movement is
/// covered by the deterministic tests below.
fn arb_trade() -> impl Strategy<Value = TradeRecord> {
    (arb_payments(), arb_middleman(), arb_amount()).prop_map(
        |(payments, middleman, grand_total)| TradeRecord {
            id: TransactionId::new(),
            date: Utc::now(),
            amount: grand_total,
            grand_total,
            payments,
            gst_amount: Decimal::ZERO,
            pst_amount: Decimal::ZERO,
            items: vec![],
            counterparty: EntityId::new("ent-1"),
            middleman,
            order_number: None,
        },
    )
}

fn counterparty_kind(side: TradeSide) -> EntityKind {
    match side {
        TradeSide::Purchase => EntityKind::Supplier,
        TradeSide::Sale => EntityKind::Customer,
    }
}

/// The document state the plans fold into.
type Docs = HashMap<DocPath, Value>;

fn put<T: serde::Serialize>(docs: &mut Docs, path: DocPath, doc: &T) {
    docs.insert(path, serde_json::to_value(doc).expect("encode fixture"));
}

fn seed_docs(
    side: TradeSide,
    record: &TradeRecord,
    counterparty_balance: Decimal,
    accounts: (Decimal, Decimal, Decimal),
) -> Docs {
    let mut docs = Docs::new();
    let mut counterparty = Entity::named("Counterparty");
    counterparty.balance = counterparty_balance;
    put(
        &mut docs,
        counterparty_kind(side).doc_path(&record.counterparty),
        &counterparty,
    );
    if let Some(settlement) = &record.middleman {
        put(
            &mut docs,
            EntityKind::Middleman.doc_path(&settlement.entity_id),
            &Entity::named("Middleman"),
        );
    }
    let account = |amount| Account {
        amount,
        updated_at: Utc::now(),
    };
    put(&mut docs, AccountKind::Cash.doc_path(), &account(accounts.0));
    put(&mut docs, AccountKind::Bank.doc_path(), &account(accounts.1));
    put(
        &mut docs,
        AccountKind::CreditCard.doc_path(),
        &account(accounts.2),
    );
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

fn entity_at(docs: &Docs, path: &DocPath) -> Entity {
    serde_json::from_value(docs.get(path).expect("entity doc").clone()).expect("decode entity")
}

fn account_amount(docs: &Docs, kind: AccountKind) -> Decimal {
    let account: Account =
        serde_json::from_value(docs.get(&kind.doc_path()).expect("account doc").clone())
            .expect("decode account");
    account.amount
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting then reversing a purchase restores every balance.
    #[test]
    fn prop_purchase_apply_then_reverse_is_identity(
        record in arb_trade(),
        counterparty_balance in arb_amount(),
        cash in arb_amount(),
        bank in arb_amount(),
        card in arb_amount(),
    ) {
        let mut docs = seed_docs(
            TradeSide::Purchase,
            &record,
            counterparty_balance,
            (cash, bank, card),
        );

        let reads = snapshot(&docs, &purchase_apply_reads(&record, &[]));
        let apply = plan_purchase_apply(&record, &[], &reads, Utc::now()).unwrap();
        fold(&mut docs, &apply);

        let reads = snapshot(&docs, &purchase_reversal_reads(&record));
        let reverse = plan_purchase_reversal(&record, &[], &reads, Utc::now()).unwrap();
        fold(&mut docs, &reverse);

        let supplier_path = EntityKind::Supplier.doc_path(&record.counterparty);
        let supplier = entity_at(&docs, &supplier_path);
        prop_assert_eq!(supplier.balance, counterparty_balance);
        prop_assert!(supplier.history.is_empty());

        prop_assert_eq!(account_amount(&docs, AccountKind::Cash), cash);
        prop_assert_eq!(account_amount(&docs, AccountKind::Bank), bank);
        prop_assert_eq!(account_amount(&docs, AccountKind::CreditCard), card);

        if let Some(settlement) = &record.middleman {
            let middleman =
                entity_at(&docs, &EntityKind::Middleman.doc_path(&settlement.entity_id));
            prop_assert_eq!(middleman.balance, Decimal::ZERO);
            prop_assert!(middleman.history.is_empty());
        }

        prop_assert!(!docs.contains_key(&transaction_path(record.id)));
    }

    /// Posting then reversing a sale restores every balance.
    #[test]
    fn prop_sale_apply_then_reverse_is_identity(
        record in arb_trade(),
        counterparty_balance in arb_amount(),
        cash in arb_amount(),
        bank in arb_amount(),
        card in arb_amount(),
    ) {
        let mut docs = seed_docs(
            TradeSide::Sale,
            &record,
            counterparty_balance,
            (cash, bank, card),
        );

        let reads = snapshot(&docs, &sale_apply_reads(&record, &[]));
        let apply = plan_sale_apply(&record, &[], &reads, Utc::now()).unwrap();
        fold(&mut docs, &apply);

        let reads = snapshot(&docs, &sale_reversal_reads(&record, &[]));
        let reverse = plan_sale_reversal(&record, &[], &reads, Utc::now()).unwrap();
        fold(&mut docs, &reverse);

        let customer = entity_at(&docs, &EntityKind::Customer.doc_path(&record.counterparty));
        prop_assert_eq!(customer.balance, counterparty_balance);
        prop_assert!(customer.history.is_empty());

        prop_assert_eq!(account_amount(&docs, AccountKind::Cash), cash);
        prop_assert_eq!(account_amount(&docs, AccountKind::Bank), bank);
        prop_assert_eq!(account_amount(&docs, AccountKind::CreditCard), card);

        prop_assert!(!docs.contains_key(&transaction_path(record.id)));
    }

    /// Reversal settles the unpaid credit with the sign fixed by the trade
    /// side: a purchase hands it back to the supplier, a sale takes it off
    /// the customer.
    #[test]
    fn prop_reversal_settles_remaining_credit(
        side in arb_side(),
        mut record in arb_trade(),
        counterparty_balance in arb_amount(),
    ) {
        record.middleman = None;
        let docs = seed_docs(side, &record, counterparty_balance, (
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        ));

        let plan = match side {
            TradeSide::Purchase => {
                let reads = snapshot(&docs, &purchase_reversal_reads(&record));
                plan_purchase_reversal(&record, &[], &reads, Utc::now()).unwrap()
            }
            TradeSide::Sale => {
                let reads = snapshot(&docs, &sale_reversal_reads(&record, &[]));
                plan_sale_reversal(&record, &[], &reads, Utc::now()).unwrap()
            }
        };

        let path = counterparty_kind(side).doc_path(&record.counterparty);
        let planned = plan.ops().iter().find_map(|op| match op {
            WriteOp::Set { path: p, data } if *p == path => {
                serde_json::from_value::<Entity>(data.clone()).ok()
            }
            _ => None,
        }).unwrap();

        let expected = match side {
            TradeSide::Purchase => {
                round_cents(counterparty_balance + record.payments.remaining_credit)
            }
            TradeSide::Sale => {
                round_cents(counterparty_balance - record.payments.remaining_credit)
            }
        };
        prop_assert_eq!(planned.balance, expected);
    }

    /// The middleman's balance moves by the settlement credit, with the sign
    /// fixed by the trade side and the settlement direction.
    #[test]
    fn prop_middleman_delta_follows_side_and_direction(
        side in arb_side(),
        direction in arb_direction(),
        credit in arb_amount(),
        mut record in arb_trade(),
    ) {
        record.middleman = Some(MiddlemanSettlement {
            entity_id: EntityId::new("mm-1"),
            direction,
            split: PaymentSplit {
                cash: Decimal::ZERO,
                bank: Decimal::ZERO,
                credit_card: Decimal::ZERO,
                credit,
            },
        });
        let docs = seed_docs(side, &record, Decimal::ZERO, (
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        ));

        let plan = match side {
            TradeSide::Purchase => {
                let reads = snapshot(&docs, &purchase_reversal_reads(&record));
                plan_purchase_reversal(&record, &[], &reads, Utc::now()).unwrap()
            }
            TradeSide::Sale => {
                let reads = snapshot(&docs, &sale_reversal_reads(&record, &[]));
                plan_sale_reversal(&record, &[], &reads, Utc::now()).unwrap()
            }
        };

        let path = EntityKind::Middleman.doc_path(&EntityId::new("mm-1"));
        let planned = plan.ops().iter().find_map(|op| match op {
            WriteOp::Set { path: p, data } if *p == path => {
                serde_json::from_value::<Entity>(data.clone()).ok()
            }
            _ => None,
        }).unwrap();

        let expected = match (side, direction) {
            (TradeSide::Purchase, SettlementDirection::Give) => credit,
            (TradeSide::Purchase, SettlementDirection::Receive) => -credit,
            (TradeSide::Sale, SettlementDirection::Give) => -credit,
            (TradeSide::Sale, SettlementDirection::Receive) => credit,
        };
        prop_assert_eq!(planned.balance, round_cents(expected));
    }

    /// Every reversal plan deletes the record last.
    #[test]
    fn prop_reversal_deletes_record_last(
        side in arb_side(),
        record in arb_trade(),
        counterparty_balance in arb_amount(),
    ) {
        let docs = seed_docs(side, &record, counterparty_balance, (
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        ));

        let plan = match side {
            TradeSide::Purchase => {
                let reads = snapshot(&docs, &purchase_reversal_reads(&record));
                plan_purchase_reversal(&record, &[], &reads, Utc::now()).unwrap()
            }
            TradeSide::Sale => {
                let reads = snapshot(&docs, &sale_reversal_reads(&record, &[]));
                plan_sale_reversal(&record, &[], &reads, Utc::now()).unwrap()
            }
        };

        let last = plan.ops().last().unwrap();
        prop_assert!(
            matches!(last, WriteOp::Delete { path } if *path == transaction_path(record.id)),
            "last op must be Delete of the transaction path, got {:?}",
            last
        );
    }

    /// Reversal strips only the reversed trade's history entries.
    #[test]
    fn prop_reversal_keeps_unrelated_history(
        record in arb_trade(),
        counterparty_balance in arb_amount(),
    ) {
        let other_id = TransactionId::new();
        let mut docs = seed_docs(
            TradeSide::Purchase,
            &record,
            counterparty_balance,
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        );

        let path = EntityKind::Supplier.doc_path(&record.counterparty);
        let mut supplier = entity_at(&docs, &path);
        supplier.push_history(HistoryEntry {
            role: HistoryRole::Supplier,
            purchase_ref: Some(other_id),
            sale_ref: None,
            recorded_at: Utc::now(),
        });
        supplier.push_history(HistoryEntry {
            role: HistoryRole::Supplier,
            purchase_ref: Some(record.id),
            sale_ref: None,
            recorded_at: Utc::now(),
        });
        put(&mut docs, path.clone(), &supplier);

        let reads = snapshot(&docs, &purchase_reversal_reads(&record));
        let plan = plan_purchase_reversal(&record, &[], &reads, Utc::now()).unwrap();
        fold(&mut docs, &plan);

        let supplier = entity_at(&docs, &path);
        prop_assert_eq!(supplier.history.len(), 1);
        prop_assert_eq!(supplier.history[0].purchase_ref, Some(other_id));
    }
}

// =========================================================================
// Deterministic tests for inventory movement and fixed scenarios
// =========================================================================

#[cfg(test)]
mod edge_case_tests {
    use super::*;
    use crate::ledger::trade::{PhonePlacement, PhoneRemoval};
    use crate::model::{Imei, LineItem, inventory};
    use rust_decimal_macros::dec;

    fn split_payment(cash: Decimal, bank: Decimal) -> PaymentBreakdown {
        PaymentBreakdown {
            cash,
            bank,
            credit_card: Decimal::ZERO,
            total_paid: cash + bank,
            remaining_credit: Decimal::ZERO,
        }
    }

    #[test]
    fn test_purchase_with_inventory_round_trips_to_seed_state() {
        let item = LineItem {
            brand: "Apple".into(),
            model: "iPhone 12".into(),
            imei: Imei::from("351100000000001"),
            capacity: 128,
            capacity_unit: "GB".into(),
            color: Some("black".into()),
            carrier: None,
            storage_location: None,
            actual_cost: Some(dec!(250)),
            unit_cost: None,
            selling_price: None,
            status: None,
        };
        let record = TradeRecord {
            id: TransactionId::new(),
            date: Utc::now(),
            amount: dec!(1000),
            grand_total: dec!(1000),
            payments: split_payment(dec!(600), dec!(400)),
            gst_amount: Decimal::ZERO,
            pst_amount: Decimal::ZERO,
            items: vec![item.clone()],
            counterparty: EntityId::new("sup-1"),
            middleman: None,
            order_number: None,
        };
        let model_path: DocPath = "brands/b1/models/m1".parse().unwrap();
        let placement = PhonePlacement {
            item,
            brand_path: "brands/b1".parse().unwrap(),
            model_path: model_path.clone(),
            phone_id: "p1".into(),
        };

        let mut docs = seed_docs(
            TradeSide::Purchase,
            &record,
            dec!(75),
            (dec!(5000), dec!(5000), dec!(0)),
        );

        let reads = snapshot(
            &docs,
            &purchase_apply_reads(&record, std::slice::from_ref(&placement)),
        );
        let apply = plan_purchase_apply(
            &record,
            std::slice::from_ref(&placement),
            &reads,
            Utc::now(),
        )
        .unwrap();
        fold(&mut docs, &apply);

        let phone_path = inventory::phones_of(&model_path).doc("p1");
        let imei_path = inventory::imei_path(&Imei::from("351100000000001"));
        assert!(docs.contains_key(&phone_path));
        assert!(docs.contains_key(&imei_path));
        assert_eq!(account_amount(&docs, AccountKind::Cash), dec!(4400));
        assert_eq!(account_amount(&docs, AccountKind::Bank), dec!(4600));

        let removal = PhoneRemoval {
            phone_path: phone_path.clone(),
            imei_path: imei_path.clone(),
        };
        let reads = snapshot(&docs, &purchase_reversal_reads(&record));
        let reverse = plan_purchase_reversal(
            &record,
            std::slice::from_ref(&removal),
            &reads,
            Utc::now(),
        )
        .unwrap();
        fold(&mut docs, &reverse);

        assert!(!docs.contains_key(&phone_path));
        assert!(!docs.contains_key(&imei_path));
        assert_eq!(account_amount(&docs, AccountKind::Cash), dec!(5000));
        assert_eq!(account_amount(&docs, AccountKind::Bank), dec!(5000));

        let supplier = entity_at(&docs, &EntityKind::Supplier.doc_path(&record.counterparty));
        assert_eq!(supplier.balance, dec!(75));
        assert!(supplier.history.is_empty());
    }

    #[test]
    fn test_zero_credit_reversal_still_strips_history() {
        let mut record = TradeRecord {
            id: TransactionId::new(),
            date: Utc::now(),
            amount: dec!(100),
            grand_total: dec!(100),
            payments: split_payment(dec!(100), Decimal::ZERO),
            gst_amount: Decimal::ZERO,
            pst_amount: Decimal::ZERO,
            items: vec![],
            counterparty: EntityId::new("sup-1"),
            middleman: None,
            order_number: None,
        };
        record.payments.remaining_credit = Decimal::ZERO;

        let mut docs = seed_docs(
            TradeSide::Purchase,
            &record,
            dec!(40),
            (dec!(100), dec!(0), dec!(0)),
        );
        let path = EntityKind::Supplier.doc_path(&record.counterparty);
        let mut supplier = entity_at(&docs, &path);
        supplier.push_history(HistoryEntry {
            role: HistoryRole::Supplier,
            purchase_ref: Some(record.id),
            sale_ref: None,
            recorded_at: Utc::now(),
        });
        put(&mut docs, path.clone(), &supplier);

        let reads = snapshot(&docs, &purchase_reversal_reads(&record));
        let plan = plan_purchase_reversal(&record, &[], &reads, Utc::now()).unwrap();
        fold(&mut docs, &plan);

        let supplier = entity_at(&docs, &path);
        assert_eq!(supplier.balance, dec!(40));
        assert!(supplier.history.is_empty());
    }
}
