//! Balance-change math shared by the posting and reversal planners.
//!
//! All deltas here are stated for the reversal direction, since reversal is
//! what the sign conventions were pinned down for; posting applies the
//! negation. Keeping both directions on one table is what makes reversal an
//! exact inverse.

use rust_decimal::Decimal;

use crate::model::{AccountKind, MiddlemanSettlement, PaymentBreakdown, SettlementDirection};

/// Which side of a trade a plan concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    /// Buying from a supplier.
    Purchase,
    /// Selling to a customer.
    Sale,
}

/// Signed deltas against the three operating accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountDeltas {
    /// Delta for the cash account.
    pub cash: Decimal,
    /// Delta for the bank account.
    pub bank: Decimal,
    /// Delta for the credit card account.
    pub credit_card: Decimal,
}

impl AccountDeltas {
    /// The delta for one account.
    #[must_use]
    pub fn get(&self, kind: AccountKind) -> Decimal {
        match kind {
            AccountKind::Cash => self.cash,
            AccountKind::Bank => self.bank,
            AccountKind::CreditCard => self.credit_card,
        }
    }

    /// All three deltas flipped.
    #[must_use]
    pub fn negated(self) -> Self {
        Self {
            cash: -self.cash,
            bank: -self.bank,
            credit_card: -self.credit_card,
        }
    }
}

fn side_sign(side: TradeSide) -> Decimal {
    match side {
        TradeSide::Purchase => Decimal::ONE,
        TradeSide::Sale => Decimal::NEGATIVE_ONE,
    }
}

fn direction_sign(direction: SettlementDirection) -> Decimal {
    match direction {
        SettlementDirection::Give => Decimal::ONE,
        SettlementDirection::Receive => Decimal::NEGATIVE_ONE,
    }
}

/// Account deltas a reversal applies for a trade.
///
/// Reversing a purchase puts the paid portions back into the accounts;
/// reversing a sale pulls the received money back out. The middleman's
/// settled share moves the same way: whatever left an account when the
/// trade was posted comes back, whatever arrived leaves again.
#[must_use]
pub fn trade_reversal_account_deltas(
    side: TradeSide,
    payments: &PaymentBreakdown,
    middleman: Option<&MiddlemanSettlement>,
) -> AccountDeltas {
    let sign = side_sign(side);
    let mut deltas = AccountDeltas {
        cash: sign * payments.cash,
        bank: sign * payments.bank,
        credit_card: sign * payments.credit_card,
    };
    if let Some(settlement) = middleman {
        let share_sign = sign * direction_sign(settlement.direction);
        deltas.cash += share_sign * settlement.split.cash;
        deltas.bank += share_sign * settlement.split.bank;
        deltas.credit_card += share_sign * settlement.split.credit_card;
    }
    deltas
}

/// Change a reversal applies to the middleman's balance.
///
/// Reversing a purchase where we gave the share adds the credit portion
/// back on; where we received, it comes off. Sales mirror both signs.
#[must_use]
pub fn middleman_reversal_delta(
    side: TradeSide,
    direction: SettlementDirection,
    credit: Decimal,
) -> Decimal {
    side_sign(side) * direction_sign(direction) * credit
}

/// Change a reversal applies to the trade counterparty's balance.
///
/// Reversing a purchase hands the unpaid portion back to the supplier;
/// reversing a sale takes the customer's unpaid portion off again.
#[must_use]
pub fn counterparty_reversal_delta(side: TradeSide, payments: &PaymentBreakdown) -> Decimal {
    side_sign(side) * payments.remaining_credit.abs()
}
