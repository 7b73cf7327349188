pub mod memory;

pub use memory::InMemoryParcelStore;

use crate::models::{
    NewTransitionRecord, ParcelId, ParcelRecord, ParcelUpdate, TrackingError, TransitionRecord,
    UserId,
};

pub type PersistenceResult<T> = Result<T, TrackingError>;

pub trait MigrationStore: Send + Sync {
    fn current_version(&self) -> PersistenceResult<i64>;

    fn apply_migration(&self, target_version: i64) -> PersistenceResult<()>;
}

/// Durable home of a parcel's tracking-observable state. The tracking core
/// treats the backing engine as external; the store's own row-level
/// concurrency control is relied on for per-record writes.
pub trait ParcelStore: Send + Sync {
    fn create_parcel(&self, record: &ParcelRecord) -> PersistenceResult<()>;

    fn get_parcel(&self, parcel_id: ParcelId) -> PersistenceResult<Option<ParcelRecord>>;

    /// Commits a partial update. Fails with `NotFound` when no row exists for
    /// `parcel_id`.
    fn update_parcel(&self, parcel_id: ParcelId, update: &ParcelUpdate) -> PersistenceResult<()>;

    fn owner_of(&self, parcel_id: ParcelId) -> PersistenceResult<Option<UserId>>;
}

pub trait TransitionStore: Send + Sync {
    fn append_transition(&self, transition: &NewTransitionRecord) -> PersistenceResult<()>;

    fn list_transitions(
        &self,
        parcel_id: ParcelId,
        limit: usize,
    ) -> PersistenceResult<Vec<TransitionRecord>>;
}
