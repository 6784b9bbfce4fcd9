//! Expense planners.
//!
//! An expense splits its total across the three account singletons and
//! touches nothing else. Unlike the other planners these work from plain
//! point-in-time account snapshots instead of a conditional read set: the
//! committing batch is atomic but does not re-check what was read, so two
//! racing operations on the same account can lose one update. Callers that
//! need the stronger guarantee must serialize expense work themselves.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vendra_shared::round_cents;

use crate::document::WritePlan;
use crate::ledger::error::PlanError;
use crate::model::transaction::transaction_path;
use crate::model::{Account, AccountKind, ExpenseRecord, Transaction};

/// Plain point-reads of the three account singletons, taken immediately
/// before planning. `None` means the account document does not exist yet.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshots {
    /// The cash account, if present.
    pub cash: Option<Account>,
    /// The bank account, if present.
    pub bank: Option<Account>,
    /// The credit card account, if present.
    pub credit_card: Option<Account>,
}

impl AccountSnapshots {
    /// Current amount of one account, zero when the document is absent.
    #[must_use]
    pub fn amount(&self, kind: AccountKind) -> Decimal {
        let account = match kind {
            AccountKind::Cash => &self.cash,
            AccountKind::Bank => &self.bank,
            AccountKind::CreditCard => &self.credit_card,
        };
        account.as_ref().map_or(Decimal::ZERO, |a| a.amount)
    }
}

fn paid_portions(record: &ExpenseRecord) -> [(AccountKind, Decimal); 3] {
    [
        (AccountKind::Cash, record.cash_paid),
        (AccountKind::Bank, record.bank_paid),
        (AccountKind::CreditCard, record.credit_card_paid),
    ]
}

fn push_account_sets(
    record: &ExpenseRecord,
    accounts: &AccountSnapshots,
    negate: bool,
    now: DateTime<Utc>,
    plan: &mut WritePlan,
) -> Result<(), PlanError> {
    for (kind, paid) in paid_portions(record) {
        if paid.is_zero() {
            continue;
        }
        let delta = if negate { -paid } else { paid };
        let account = Account {
            amount: round_cents(accounts.amount(kind) + delta),
            updated_at: now,
        };
        plan.set(kind.doc_path(), &account)?;
    }
    Ok(())
}

/// Plans the reversal of an expense: each paid portion goes back into its
/// account, creating the account document if it is absent, and the expense
/// record is deleted.
pub fn plan_expense_reversal(
    record: &ExpenseRecord,
    accounts: &AccountSnapshots,
    now: DateTime<Utc>,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_account_sets(record, accounts, false, now, &mut plan)?;
    plan.delete(transaction_path(record.id));
    Ok(plan)
}

/// Plans the posting of an expense: each paid portion comes out of its
/// account and the record is created.
pub fn plan_expense_apply(
    record: &ExpenseRecord,
    accounts: &AccountSnapshots,
    now: DateTime<Utc>,
) -> Result<WritePlan, PlanError> {
    let mut plan = WritePlan::new();
    push_account_sets(record, accounts, true, now, &mut plan)?;
    plan.set(
        transaction_path(record.id),
        &Transaction::Expense(record.clone()),
    )?;
    Ok(plan)
}
