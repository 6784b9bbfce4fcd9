//! Core planning logic for Vendra.
//!
//! This crate contains pure business logic with ZERO store dependencies.
//! Planners turn a stored transaction record plus a point-in-time read
//! snapshot into a write plan; executing reads and plans belongs to the
//! store crate.
//!
//! # Modules
//!
//! - `document` - Document paths, read plans, write plans, and snapshots
//! - `model` - Record shapes for every collection
//! - `ledger` - Posting and reversal planners with their balance math

pub mod document;
pub mod ledger;
pub mod model;
