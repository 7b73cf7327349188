use std::time::SystemTime;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParcelId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Delivery lifecycle of a parcel. The tracking state machine only ever
/// advances `Pending -> InTransit -> Delivered`; `Cancelled` is set by
/// external actors and is never produced by a tracking worker.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

/// A parcel row as the store hands it out. All tracking-observable state
/// lives on this record; there is no separate tracking table.
#[derive(Clone, Debug, PartialEq)]
pub struct ParcelRecord {
    pub id: ParcelId,
    pub owner: UserId,
    pub status: ParcelStatus,
    pub current_location: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub cost: Option<f64>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl ParcelRecord {
    pub fn new(id: ParcelId, owner: UserId, created_at: SystemTime) -> Self {
        Self {
            id,
            owner,
            status: ParcelStatus::Pending,
            current_location: None,
            description: None,
            destination: None,
            cost: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// Partial update applied to a parcel row. `updated_at` is always written;
/// absent fields leave the column untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct ParcelUpdate {
    pub status: Option<ParcelStatus>,
    pub current_location: Option<String>,
    pub updated_at: SystemTime,
}

impl ParcelUpdate {
    pub fn at(updated_at: SystemTime) -> Self {
        Self {
            status: None,
            current_location: None,
            updated_at,
        }
    }

    pub fn status(mut self, status: ParcelStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.current_location = Some(location.into());
        self
    }
}
