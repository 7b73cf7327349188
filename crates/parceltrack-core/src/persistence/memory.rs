use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{
    NewTransitionRecord, ParcelId, ParcelRecord, ParcelUpdate, TrackingError, TrackingErrorKind,
    TransitionRecord, UserId,
};
use crate::persistence::{ParcelStore, PersistenceResult, TransitionStore};

/// Parcel store backed by a plain in-process map. Used by tests and by
/// embedders that do not need durability.
#[derive(Default)]
pub struct InMemoryParcelStore {
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    parcels: HashMap<ParcelId, ParcelRecord>,
    transitions: Vec<TransitionRecord>,
    next_transition_id: u64,
}

impl InMemoryParcelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> PersistenceResult<std::sync::MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| TrackingError {
            parcel: None,
            kind: TrackingErrorKind::Internal,
            message: "parcel store mutex poisoned".to_string(),
        })
    }
}

impl ParcelStore for InMemoryParcelStore {
    fn create_parcel(&self, record: &ParcelRecord) -> PersistenceResult<()> {
        let mut state = self.lock_state()?;
        if state.parcels.contains_key(&record.id) {
            return Err(TrackingError {
                parcel: Some(record.id),
                kind: TrackingErrorKind::InvalidInput,
                message: format!("parcel '{}' already exists", record.id.0),
            });
        }
        state.parcels.insert(record.id, record.clone());
        Ok(())
    }

    fn get_parcel(&self, parcel_id: ParcelId) -> PersistenceResult<Option<ParcelRecord>> {
        let state = self.lock_state()?;
        Ok(state.parcels.get(&parcel_id).cloned())
    }

    fn update_parcel(&self, parcel_id: ParcelId, update: &ParcelUpdate) -> PersistenceResult<()> {
        let mut state = self.lock_state()?;
        let record = state
            .parcels
            .get_mut(&parcel_id)
            .ok_or_else(|| TrackingError::not_found(parcel_id))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(location) = &update.current_location {
            record.current_location = Some(location.clone());
        }
        record.updated_at = update.updated_at;

        Ok(())
    }

    fn owner_of(&self, parcel_id: ParcelId) -> PersistenceResult<Option<UserId>> {
        let state = self.lock_state()?;
        Ok(state.parcels.get(&parcel_id).map(|record| record.owner))
    }
}

impl TransitionStore for InMemoryParcelStore {
    fn append_transition(&self, transition: &NewTransitionRecord) -> PersistenceResult<()> {
        let mut state = self.lock_state()?;
        let id = state.next_transition_id;
        state.next_transition_id = state.next_transition_id.saturating_add(1);
        state.transitions.push(TransitionRecord {
            id,
            parcel_id: transition.parcel_id,
            old_status: transition.old_status,
            new_status: transition.new_status,
            old_location: transition.old_location.clone(),
            new_location: transition.new_location.clone(),
            recorded_at: transition.recorded_at,
        });
        Ok(())
    }

    fn list_transitions(
        &self,
        parcel_id: ParcelId,
        limit: usize,
    ) -> PersistenceResult<Vec<TransitionRecord>> {
        let state = self.lock_state()?;
        Ok(state
            .transitions
            .iter()
            .filter(|transition| transition.parcel_id == parcel_id)
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
