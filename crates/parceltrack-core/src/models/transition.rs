use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::models::{ParcelId, ParcelStatus};

/// One persisted step of a parcel's journey, as recorded by the tracking
/// worker (or an admin edit elsewhere in the system).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: u64,
    pub parcel_id: ParcelId,
    pub old_status: Option<ParcelStatus>,
    pub new_status: ParcelStatus,
    pub old_location: Option<String>,
    pub new_location: Option<String>,
    pub recorded_at: SystemTime,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTransitionRecord {
    pub parcel_id: ParcelId,
    pub old_status: Option<ParcelStatus>,
    pub new_status: ParcelStatus,
    pub old_location: Option<String>,
    pub new_location: Option<String>,
    pub recorded_at: SystemTime,
}
