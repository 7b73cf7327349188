use std::time::{Duration, SystemTime};

use crate::models::{EstimatedDelivery, ParcelStatus};

const PENDING_ETA: Duration = Duration::from_secs(2 * 60 * 60);
const IN_TRANSIT_ETA: Duration = Duration::from_secs(60 * 60);
const FALLBACK_ETA: Duration = Duration::from_secs(3 * 60 * 60);

/// Delivery estimate for a parcel in the given status. Stateless: callers
/// pass the query-time `now` and must re-evaluate on every query rather than
/// cache the result.
pub fn estimated_delivery(status: ParcelStatus, now: SystemTime) -> EstimatedDelivery {
    match status {
        ParcelStatus::Pending => EstimatedDelivery::At(now + PENDING_ETA),
        ParcelStatus::InTransit => EstimatedDelivery::At(now + IN_TRANSIT_ETA),
        ParcelStatus::Delivered => EstimatedDelivery::Delivered,
        // Legacy fallback: cancelled parcels still get a three-hour window.
        ParcelStatus::Cancelled => EstimatedDelivery::At(now + FALLBACK_ETA),
    }
}
