use std::fmt::{Display, Formatter};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::models::{ParcelId, ParcelStatus};

/// Human-displayable delivery estimate. Delivered parcels report the literal
/// string "Delivered" instead of a timestamp; every other status carries a
/// point in time formatted as `%Y-%m-%d %H:%M` (UTC).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EstimatedDelivery {
    Delivered,
    At(SystemTime),
}

impl Display for EstimatedDelivery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => f.write_str("Delivered"),
            Self::At(when) => {
                write!(f, "{}", DateTime::<Utc>::from(*when).format("%Y-%m-%d %H:%M"))
            }
        }
    }
}

impl Serialize for EstimatedDelivery {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Snapshot returned by `TrackingSupervisor::get_tracking_info`. Combines the
/// persisted parcel row with the live registry membership and a freshly
/// evaluated delivery estimate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackingInfo {
    pub parcel_id: ParcelId,
    pub current_location: Option<String>,
    pub status: ParcelStatus,
    pub estimated_delivery: EstimatedDelivery,
    pub is_tracking: bool,
    pub last_updated: DateTime<Utc>,
}

/// Composite view for live-tracking consumers: the tracking snapshot merged
/// with the parcel's raw display fields and a server-generated timestamp.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LiveTrackingView {
    pub parcel_id: ParcelId,
    pub current_location: Option<String>,
    pub status: ParcelStatus,
    pub estimated_delivery: EstimatedDelivery,
    pub is_tracking: bool,
    pub last_updated: DateTime<Utc>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub tracking_active: bool,
}
