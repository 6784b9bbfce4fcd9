//! Per-holder foreign currency balances.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vendra_shared::{Currency, EntityId, round_cents};

use crate::document::{CollectionPath, DocPath};
use crate::model::collections;

/// Reserved holder id for the operator's own cash currency holdings.
pub const MYSELF_CASH_ID: &str = "myself_special_id";

/// Reserved holder id for the operator's own bank currency holdings.
pub const MYSELF_BANK_ID: &str = "myself_bank_special_id";

/// Who a currency balance document belongs to.
///
/// Transfer records store the giver and taker as bare document ids; the two
/// reserved ids mark the operator's own holdings and everything else names
/// an entity. This enum owns that mapping so the literals appear in exactly
/// one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BalanceHolder {
    /// The operator's own cash holdings.
    OwnCash,
    /// The operator's own bank holdings.
    OwnBank,
    /// A customer, middleman, or supplier.
    Entity(EntityId),
}

impl BalanceHolder {
    /// Document id inside the currency-balance collection.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        match self {
            Self::OwnCash => MYSELF_CASH_ID,
            Self::OwnBank => MYSELF_BANK_ID,
            Self::Entity(id) => id.as_str(),
        }
    }

    /// Path of this holder's balance document.
    #[must_use]
    pub fn doc_path(&self) -> DocPath {
        CollectionPath::root(collections::CURRENCY_BALANCES).doc(self.doc_id())
    }

    /// The entity id, unless this is one of the operator's own holdings.
    #[must_use]
    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            Self::Entity(id) => Some(id),
            _ => None,
        }
    }
}

impl From<String> for BalanceHolder {
    fn from(id: String) -> Self {
        match id.as_str() {
            MYSELF_CASH_ID => Self::OwnCash,
            MYSELF_BANK_ID => Self::OwnBank,
            _ => Self::Entity(EntityId::new(id)),
        }
    }
}

impl From<BalanceHolder> for String {
    fn from(holder: BalanceHolder) -> Self {
        holder.doc_id().to_string()
    }
}

impl std::fmt::Display for BalanceHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.doc_id())
    }
}

/// A holder's currency balance document: currency name to signed amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBalances {
    /// Signed amount per currency name. Missing means zero.
    #[serde(default)]
    pub balances: HashMap<String, Decimal>,
}

impl CurrencyBalances {
    /// Current amount in the given currency, zero when absent.
    #[must_use]
    pub fn amount(&self, currency: &Currency) -> Decimal {
        self.balances
            .get(currency.as_str())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Adds a signed delta to the given currency, rounded to cents.
    pub fn add(&mut self, currency: &Currency, delta: Decimal) {
        let next = round_cents(self.amount(currency) + delta);
        self.balances.insert(currency.as_str().to_string(), next);
    }
}
