//! Document store and the engines that drive the books.
//!
//! This crate provides:
//! - The `DocumentStore` contract: point reads, field-equality queries,
//!   versioned snapshot reads, and conditional or unconditional commits
//! - An in-memory backend implementing the contract
//! - Typed repositories over the raw document API
//! - The posting and reversal engines that execute the planners from
//!   `vendra-core` against a store

pub mod contract;
pub mod engine;
pub mod memory;
pub mod repository;

pub use contract::{DocumentStore, StoreError};
pub use engine::{PostingEngine, PostingError, ReversalEngine, ReversalError};
pub use memory::MemoryStore;
