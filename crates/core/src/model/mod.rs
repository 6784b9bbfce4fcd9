//! Record shapes for every collection in the books.
//!
//! Documents are stored as JSON; every shape here derives serde both ways so
//! the store crate can round-trip them without bespoke mapping code.

pub mod account;
pub mod currency;
pub mod entity;
pub mod inventory;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use currency::{BalanceHolder, CurrencyBalances, MYSELF_BANK_ID, MYSELF_CASH_ID};
pub use entity::{Entity, EntityKind, HistoryEntry, HistoryRole};
pub use inventory::{BrandRecord, Imei, ImeiRecord, ModelRecord, PhoneRecord, PhoneStatus};
pub use transaction::{
    AdjustmentRecord, ExpenseRecord, LineItem, MiddlemanSettlement, OrderNumberRecord,
    OrderNumberRef, PaymentBreakdown, PaymentSplit, SettlementDirection, TradeRecord,
    Transaction, TransactionKind, TransferRecord,
};

/// Collection names used across the store.
pub mod collections {
    /// Customer entity documents.
    pub const CUSTOMERS: &str = "customers";
    /// Supplier entity documents.
    pub const SUPPLIERS: &str = "suppliers";
    /// Middleman entity documents.
    pub const MIDDLEMEN: &str = "middlemen";
    /// Operating money accounts (fixed ids: cash, bank, credit card).
    pub const ACCOUNTS: &str = "accounts";
    /// Per-holder foreign currency balance documents.
    pub const CURRENCY_BALANCES: &str = "currency_balances";
    /// Phone brand documents; models and phones nest underneath.
    pub const BRANDS: &str = "brands";
    /// Model subcollection under a brand.
    pub const MODELS: &str = "models";
    /// Phone subcollection under a model.
    pub const PHONES: &str = "phones";
    /// IMEI lookup documents keyed by the IMEI itself.
    pub const IMEI_INDEX: &str = "imei_index";
    /// Posted transaction records of every kind.
    pub const TRANSACTIONS: &str = "transactions";
    /// Order-number records referenced by purchases and sales.
    pub const ORDER_NUMBERS: &str = "order_numbers";
}
