//! Customers, suppliers, and middlemen.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vendra_shared::{EntityId, TransactionId};

use crate::document::{CollectionPath, DocPath};
use crate::model::collections;

/// Which of the three entity collections a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Buys phones from us.
    Customer,
    /// Sells phones to us.
    Supplier,
    /// Brokers a trade for a settlement share.
    Middleman,
}

impl EntityKind {
    /// Lookup order used when a record does not say which collection holds
    /// an entity id. The order is fixed; changing it changes which document
    /// a duplicated id resolves to.
    pub const PROBE_ORDER: [Self; 3] = [Self::Customer, Self::Middleman, Self::Supplier];

    /// The collection documents of this kind live in.
    #[must_use]
    pub fn collection(self) -> CollectionPath {
        CollectionPath::root(match self {
            Self::Customer => collections::CUSTOMERS,
            Self::Supplier => collections::SUPPLIERS,
            Self::Middleman => collections::MIDDLEMEN,
        })
    }

    /// Path of the entity document with the given id.
    #[must_use]
    pub fn doc_path(self, id: &EntityId) -> DocPath {
        self.collection().doc(id.as_str())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Supplier => write!(f, "supplier"),
            Self::Middleman => write!(f, "middleman"),
        }
    }
}

/// Role an entity played in a recorded trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRole {
    /// Sold us the phones on a purchase.
    Supplier,
    /// Bought the phones on a sale.
    Customer,
    /// Brokered the trade.
    Middleman,
}

/// One trade participation embedded in an entity document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Role the entity played.
    pub role: HistoryRole,
    /// The purchase this entry belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_ref: Option<TransactionId>,
    /// The sale this entry belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_ref: Option<TransactionId>,
    /// When the entry was recorded.
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl HistoryEntry {
    /// Whether this entry points at the given transaction.
    #[must_use]
    pub fn references(&self, id: TransactionId) -> bool {
        self.purchase_ref == Some(id) || self.sale_ref == Some(id)
    }
}

/// An entity document: a customer, supplier, or middleman.
///
/// The `balance` field carries the entity's outstanding CAD position, built
/// up from the unpaid credit portions of posted trades and from balance
/// adjustments. Non-CAD holdings live in the currency-balance collection,
/// not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Display name.
    pub name: String,
    /// Outstanding CAD balance.
    #[serde(default)]
    pub balance: Decimal,
    /// Trade participations, newest last.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Entity {
    /// A fresh entity with a zero balance and no history.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balance: Decimal::ZERO,
            history: Vec::new(),
        }
    }

    /// Appends a trade participation.
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Drops every history entry that points at the given transaction.
    pub fn remove_history(&mut self, id: TransactionId) {
        self.history.retain(|entry| !entry.references(id));
    }
}
