//! Phone inventory: brands, models, phones, and the IMEI index.
//!
//! Phones live three levels deep (`brands/{b}/models/{m}/phones/{p}`), so a
//! phone's path pins down its brand and model documents. The IMEI index is a
//! flat collection keyed by the IMEI itself pointing back at the phone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::{CollectionPath, DocPath};
use crate::model::collections;

/// A phone's IMEI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Imei(String);

impl Imei {
    /// Wraps an IMEI string.
    pub fn new(imei: impl Into<String>) -> Self {
        Self(imei.into())
    }

    /// The IMEI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Imei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Imei {
    fn from(imei: &str) -> Self {
        Self(imei.to_string())
    }
}

/// Lifecycle state of a phone in inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneStatus {
    /// In stock and sellable.
    Active,
    /// Sold and gone from inventory.
    Sold,
    /// Held back from sale.
    Reserved,
}

/// A brand document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRecord {
    /// Brand name as shown to the operator.
    pub name: String,
}

/// A model document under a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Model name as shown to the operator.
    pub name: String,
}

/// A phone document under a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneRecord {
    /// The phone's IMEI.
    pub imei: Imei,
    /// Denormalized brand name.
    pub brand: String,
    /// Denormalized model name.
    pub model: String,
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
    /// Where the phone is kept, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    /// What the phone cost us.
    pub unit_cost: Decimal,
    /// Lifecycle state.
    pub status: PhoneStatus,
}

fn default_capacity_unit() -> String {
    "GB".to_string()
}

/// An IMEI index document, stored at `imei_index/{imei}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImeiRecord {
    /// The IMEI, repeated from the document id.
    pub imei: Imei,
    /// Denormalized brand name.
    pub brand: String,
    /// Denormalized model name.
    pub model: String,
    /// Path of the phone document this IMEI belongs to.
    pub phone_path: DocPath,
}

/// The top-level brands collection.
#[must_use]
pub fn brands() -> CollectionPath {
    CollectionPath::root(collections::BRANDS)
}

/// The models collection under a brand document.
#[must_use]
pub fn models_of(brand: &DocPath) -> CollectionPath {
    brand.collection(collections::MODELS)
}

/// The phones collection under a model document.
#[must_use]
pub fn phones_of(model: &DocPath) -> CollectionPath {
    model.collection(collections::PHONES)
}

/// Path of the index document for an IMEI.
#[must_use]
pub fn imei_path(imei: &Imei) -> DocPath {
    CollectionPath::root(collections::IMEI_INDEX).doc(imei.as_str())
}
