//! Document addressing and mutation planning.
//!
//! Everything a planner exchanges with the store is plain data: a
//! [`ReadPlan`] naming the documents an operation depends on, a [`ReadSet`]
//! snapshot the store hands back, and a [`WritePlan`] describing the
//! mutations to commit. Keeping these as data is what lets the planners stay
//! pure and the read-before-write discipline stay checkable.

pub mod path;
pub mod plan;

pub use path::{CollectionPath, DocPath, ParsePathError};
pub use plan::{ReadEntry, ReadPlan, ReadSet, SnapshotError, WriteOp, WritePlan};
