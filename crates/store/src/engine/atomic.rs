//! The optimistic snapshot-build-commit loop shared by both engines.

use vendra_core::document::{ReadPlan, ReadSet, WritePlan};

use crate::contract::{DocumentStore, StoreError};

/// Why an atomic round gave up.
pub(crate) enum AtomicError<E> {
    /// The build step rejected the snapshot.
    Build(E),
    /// The store failed outside the commit race.
    Store(StoreError),
    /// Every attempt lost the commit race.
    RetriesExhausted(u32),
}

/// Snapshots the read plan, builds a write plan from the snapshot, and
/// commits it conditioned on the snapshot's versions. A conflicting commit
/// is retried from a fresh snapshot up to `max_attempts` times.
pub(crate) async fn run_atomic<E, F>(
    store: &dyn DocumentStore,
    read_plan: &ReadPlan,
    max_attempts: u32,
    build: F,
) -> Result<(), AtomicError<E>>
where
    F: Fn(&ReadSet) -> Result<WritePlan, E>,
{
    for attempt in 1..=max_attempts {
        let reads = store
            .read_set(read_plan)
            .await
            .map_err(AtomicError::Store)?;
        let plan = build(&reads).map_err(AtomicError::Build)?;
        match store.commit(&reads, plan).await {
            Ok(()) => return Ok(()),
            Err(StoreError::Conflict(path)) => {
                tracing::warn!(attempt, %path, "commit lost a version race, retrying");
            }
            Err(other) => return Err(AtomicError::Store(other)),
        }
    }
    tracing::error!(max_attempts, "every commit attempt lost a version race, giving up");
    Err(AtomicError::RetriesExhausted(max_attempts))
}
