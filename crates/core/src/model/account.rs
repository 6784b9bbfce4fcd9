//! Operating money accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::{CollectionPath, DocPath};
use crate::model::collections;

/// The three operating accounts money moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Physical cash on hand.
    Cash,
    /// The bank account.
    Bank,
    /// The credit card.
    CreditCard,
}

impl AccountKind {
    /// All three accounts, in the order plans touch them.
    pub const ALL: [Self; 3] = [Self::Cash, Self::Bank, Self::CreditCard];

    /// Fixed document id inside the accounts collection.
    #[must_use]
    pub fn doc_id(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::CreditCard => "credit_card",
        }
    }

    /// Path of this account's document.
    #[must_use]
    pub fn doc_path(self) -> DocPath {
        CollectionPath::root(collections::ACCOUNTS).doc(self.doc_id())
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.doc_id())
    }
}

/// An account document. Balances may go negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Current CAD amount.
    pub amount: Decimal,
    /// When the amount last changed.
    pub updated_at: DateTime<Utc>,
}
