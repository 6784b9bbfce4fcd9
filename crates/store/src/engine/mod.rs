//! The posting and reversal engines.
//!
//! Engines wire the pure planners from `vendra-core` to a [`DocumentStore`]:
//! they pre-resolve inventory lookups outside the atomic phase, snapshot the
//! documents the planner needs, build the write plan against that snapshot,
//! and commit it conditionally, retrying with a fresh snapshot when the
//! commit loses a version race.
//!
//! [`DocumentStore`]: crate::contract::DocumentStore

mod atomic;

pub mod error;
pub mod posting;
pub mod prefetch;
pub mod reversal;

pub use error::{PostingError, ReversalError};
pub use posting::PostingEngine;
pub use reversal::ReversalEngine;
