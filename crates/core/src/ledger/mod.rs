//! Posting and reversal planners.
//!
//! Each transaction kind gets a pair of pure planners: one that applies the
//! transaction's effects and one that reverses them exactly. A planner never
//! touches the store; it receives the record, a read snapshot covering every
//! document it may depend on, and returns the write plan to commit. The
//! store crate re-reads and re-plans on conflict, so planners must be
//! deterministic for a given snapshot.
//!
//! Expenses are the exception to the read-snapshot rule: their account
//! totals come from plain point reads and the plan commits unconditionally,
//! so concurrent expense work on the same account can lose an update.

pub mod adjustment;
pub mod balance;
pub mod error;
pub mod expense;
pub mod trade;
pub mod transfer;

pub use balance::{AccountDeltas, TradeSide};
pub use error::PlanError;
pub use expense::AccountSnapshots;
pub use trade::{PhonePlacement, PhoneRemoval, SoldItem};

#[cfg(test)]
mod trade_props;
#[cfg(test)]
mod transfer_props;
