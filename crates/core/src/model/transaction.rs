//! Posted transaction records.
//!
//! Every posted transaction lives in one collection as a tagged union; the
//! `type` field names the kind. Records are immutable once posted: the only
//! write ever applied to one is its deletion during reversal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vendra_shared::{Currency, EntityId, OrderNumberId, TransactionId};

use crate::document::{CollectionPath, DocPath};
use crate::model::collections;
use crate::model::currency::BalanceHolder;
use crate::model::entity::EntityKind;
use crate::model::inventory::{Imei, PhoneStatus};

/// Path of a transaction record.
#[must_use]
pub fn transaction_path(id: TransactionId) -> DocPath {
    CollectionPath::root(collections::TRANSACTIONS).doc(id.to_string())
}

/// Path of an order-number record.
#[must_use]
pub fn order_number_path(id: OrderNumberId) -> DocPath {
    CollectionPath::root(collections::ORDER_NUMBERS).doc(id.to_string())
}

/// The five kinds of posted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Phones bought from a supplier.
    Purchase,
    /// Phones sold to a customer.
    Sale,
    /// Money moved between currency holders.
    CurrencyTransfer,
    /// Money spent out of the accounts.
    Expense,
    /// Manual correction of an entity balance.
    BalanceAdjustment,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchase => write!(f, "purchase"),
            Self::Sale => write!(f, "sale"),
            Self::CurrencyTransfer => write!(f, "currency_transfer"),
            Self::Expense => write!(f, "expense"),
            Self::BalanceAdjustment => write!(f, "balance_adjustment"),
        }
    }
}

/// A posted transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    /// Phones bought from a supplier.
    Purchase(TradeRecord),
    /// Phones sold to a customer.
    Sale(TradeRecord),
    /// Money moved between currency holders.
    CurrencyTransfer(TransferRecord),
    /// Money spent out of the accounts.
    Expense(ExpenseRecord),
    /// Manual correction of an entity balance.
    BalanceAdjustment(AdjustmentRecord),
}

impl Transaction {
    /// The record's kind tag.
    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Purchase(_) => TransactionKind::Purchase,
            Self::Sale(_) => TransactionKind::Sale,
            Self::CurrencyTransfer(_) => TransactionKind::CurrencyTransfer,
            Self::Expense(_) => TransactionKind::Expense,
            Self::BalanceAdjustment(_) => TransactionKind::BalanceAdjustment,
        }
    }

    /// The record's id.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        match self {
            Self::Purchase(record) | Self::Sale(record) => record.id,
            Self::CurrencyTransfer(record) => record.id,
            Self::Expense(record) => record.id,
            Self::BalanceAdjustment(record) => record.id,
        }
    }

    /// Path of this record's document.
    #[must_use]
    pub fn doc_path(&self) -> DocPath {
        transaction_path(self.id())
    }
}

/// How a trade's grand total was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentBreakdown {
    /// Paid from cash.
    pub cash: Decimal,
    /// Paid from the bank account.
    pub bank: Decimal,
    /// Paid on the credit card.
    pub credit_card: Decimal,
    /// Sum of the three paid portions.
    pub total_paid: Decimal,
    /// Unpaid portion carried on the counterparty's balance.
    pub remaining_credit: Decimal,
}

/// Which way money moved between us and the middleman.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementDirection {
    /// We paid the middleman.
    Give,
    /// The middleman paid us.
    Receive,
}

/// How a middleman's share was settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSplit {
    /// Settled in cash.
    pub cash: Decimal,
    /// Settled through the bank account.
    pub bank: Decimal,
    /// Settled on the credit card.
    pub credit_card: Decimal,
    /// Carried on the middleman's balance instead of settled.
    pub credit: Decimal,
}

/// A middleman's involvement in a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlemanSettlement {
    /// The middleman's entity id.
    pub entity_id: EntityId,
    /// Which way the settlement moved.
    pub direction: SettlementDirection,
    /// The settled share.
    #[serde(default)]
    pub split: PaymentSplit,
}

/// Reference to an order-number record, with the number denormalized onto
/// the trade for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNumberRef {
    /// Id of the order-number document.
    pub id: OrderNumberId,
    /// The customer-facing order number.
    pub number: String,
}

impl OrderNumberRef {
    /// Mints a reference for a new order number.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            id: OrderNumberId::new(),
            number: number.into(),
        }
    }
}

/// An order-number document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNumberRecord {
    /// The customer-facing order number.
    pub number: String,
    /// Which kind of trade the number belongs to.
    pub kind: TransactionKind,
    /// The trade that allocated the number.
    pub trade_ref: TransactionId,
}

/// One phone on a purchase or sale.
///
/// Line items are denormalized: they carry everything needed to recreate the
/// phone document later, because the phone itself is deleted when sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Brand name.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// The phone's IMEI.
    pub imei: Imei,
    /// Storage capacity.
    #[serde(default)]
    pub capacity: u32,
    /// Unit for the capacity figure.
    #[serde(default = "default_capacity_unit")]
    pub capacity_unit: String,
    /// Color, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Carrier lock, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// Where the phone was kept, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    /// What the phone actually cost on this trade's purchase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<Decimal>,
    /// Historical unit cost carried from the phone document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,
    /// Per-unit price on a sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Decimal>,
    /// The phone's status when the trade was posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PhoneStatus>,
}

fn default_capacity_unit() -> String {
    "GB".to_string()
}

impl LineItem {
    /// Cost stamped onto a recreated phone: the actual cost when known,
    /// otherwise the carried historical unit cost. Never the selling price.
    #[must_use]
    pub fn restored_unit_cost(&self) -> Decimal {
        self.actual_cost
            .or(self.unit_cost)
            .unwrap_or(Decimal::ZERO)
    }

    /// Status stamped onto a recreated phone.
    #[must_use]
    pub fn restored_status(&self) -> PhoneStatus {
        self.status.unwrap_or(PhoneStatus::Active)
    }
}

/// A purchase or sale record. The variant tag says which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Record id.
    pub id: TransactionId,
    /// When the trade was posted.
    pub date: DateTime<Utc>,
    /// Headline amount, kept equal to the grand total.
    pub amount: Decimal,
    /// Total owed for the trade including taxes.
    pub grand_total: Decimal,
    /// How the grand total was paid.
    #[serde(default)]
    pub payments: PaymentBreakdown,
    /// GST portion of the total.
    #[serde(default)]
    pub gst_amount: Decimal,
    /// PST portion of the total.
    #[serde(default)]
    pub pst_amount: Decimal,
    /// The phones traded.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// The supplier (purchase) or customer (sale).
    pub counterparty: EntityId,
    /// Middleman involvement, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleman: Option<MiddlemanSettlement>,
    /// Order number allocated for this trade, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<OrderNumberRef>,
}

/// A currency transfer record, possibly an exchange.
///
/// The giver, taker, and currency are optional because legacy rows are
/// missing them; reversal refuses such rows as invalid rather than guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Record id.
    pub id: TransactionId,
    /// When the transfer was posted.
    pub date: DateTime<Utc>,
    /// Amount the giver sent, in `currency`.
    pub amount: Decimal,
    /// Who gave the money.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub giver: Option<BalanceHolder>,
    /// Who received the money.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker: Option<BalanceHolder>,
    /// Currency of the sent amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    /// Whether a second leg flowed back in another currency.
    #[serde(default)]
    pub is_exchange: bool,
    /// Currency of the returned leg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiving_currency: Option<Currency>,
    /// Amount of the returned leg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_amount: Option<Decimal>,
    /// Rate the exchange was struck at, for the record only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Decimal>,
}

/// An expense record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Record id.
    pub id: TransactionId,
    /// When the expense was posted.
    pub date: DateTime<Utc>,
    /// Total spent.
    pub amount: Decimal,
    /// Portion paid from cash.
    #[serde(default)]
    pub cash_paid: Decimal,
    /// Portion paid from the bank account.
    #[serde(default)]
    pub bank_paid: Decimal,
    /// Portion paid on the credit card.
    #[serde(default)]
    pub credit_card_paid: Decimal,
    /// What the money went to.
    #[serde(default)]
    pub notes: String,
}

/// A balance adjustment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    /// Record id.
    pub id: TransactionId,
    /// When the adjustment was posted.
    pub date: DateTime<Utc>,
    /// Headline amount, kept equal to the adjustment amount.
    pub amount: Decimal,
    /// The adjusted entity. Absent on some legacy rows, which makes the
    /// record unreversible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    /// Which collection holds the entity, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<EntityKind>,
    /// Currency the adjustment was made in.
    pub currency: Currency,
    /// Balance observed before the adjustment.
    pub initial_balance: Decimal,
    /// Balance after the adjustment.
    pub final_balance: Decimal,
    /// Signed amount added to the balance.
    pub adjustment_amount: Decimal,
}
