//! Currency codes and decimal-safe money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the system is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A currency name as recorded on documents (e.g. "CAD", "USD").
///
/// Currency names are operator-defined strings rather than a closed ISO set.
/// Names are trimmed and uppercased on construction, so any spelling of a
/// currency reads and writes the same balance entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

/// Error returned when a currency name is empty.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("currency name cannot be empty")]
pub struct ParseCurrencyError;

impl Currency {
    /// The home currency. Entity balances in CAD live on the entity document
    /// itself; every other currency lives in the per-holder balance map.
    pub const CAD: &'static str = "CAD";

    /// Creates a currency from a name, trimming surrounding whitespace and
    /// normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ParseCurrencyError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ParseCurrencyError);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// The home currency.
    #[must_use]
    pub fn cad() -> Self {
        Self(Self::CAD.to_string())
    }

    /// Returns the currency name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the home currency.
    #[must_use]
    pub fn is_cad(&self) -> bool {
        self.0 == Self::CAD
    }
}

impl TryFrom<String> for Currency {
    type Error = ParseCurrencyError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Rounds an amount to cent precision using banker's rounding (round half to
/// even) to minimize cumulative errors across many balance updates.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}
