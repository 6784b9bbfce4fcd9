//! Planner failures.

use thiserror::Error;
use vendra_shared::EntityId;

use crate::document::SnapshotError;
use crate::model::Imei;

/// Failure while turning a record and a read snapshot into a write plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A required document is missing or unreadable.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// No entity collection contains the referenced id.
    #[error("no entity found for id {0}")]
    UnknownEntity(EntityId),
    /// The record is missing a field the operation depends on.
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    /// A phone with this IMEI is already registered in inventory.
    #[error("imei {0} is already registered to a phone in inventory")]
    DuplicateImei(Imei),
    /// The phone is not in a sellable state.
    #[error("phone {0} is not available for sale")]
    PhoneUnavailable(Imei),
    /// Encoding a planned document failed.
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}
