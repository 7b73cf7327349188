use crate::models::ParcelStatus;

/// One leg of the simulated journey: a delivery status and the ordered
/// location labels a parcel passes through while in that status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JourneyLeg {
    pub status: ParcelStatus,
    pub locations: &'static [&'static str],
}

const PENDING_LOCATIONS: &[&str] = &[
    "Warehouse - Sorting Center",
    "Loading Dock - Ready for Pickup",
    "Courier Assigned - En Route to Pickup",
];

const IN_TRANSIT_LOCATIONS: &[&str] = &[
    "Picked up from sender",
    "In transit - Nairobi Central",
    "In transit - Thika Road",
    "In transit - Juja Junction",
    "In transit - Thika Town Center",
    "Approaching destination",
    "Out for delivery",
];

const DELIVERED_LOCATIONS: &[&str] = &["Delivered to recipient"];

/// The journey script, in the fixed status order every tracked parcel walks.
/// Shared read-only by all workers; carries no per-parcel data.
const JOURNEY: [JourneyLeg; 3] = [
    JourneyLeg {
        status: ParcelStatus::Pending,
        locations: PENDING_LOCATIONS,
    },
    JourneyLeg {
        status: ParcelStatus::InTransit,
        locations: IN_TRANSIT_LOCATIONS,
    },
    JourneyLeg {
        status: ParcelStatus::Delivered,
        locations: DELIVERED_LOCATIONS,
    },
];

pub fn journey() -> &'static [JourneyLeg] {
    &JOURNEY
}

pub fn leg(status: ParcelStatus) -> Option<&'static JourneyLeg> {
    JOURNEY.iter().find(|leg| leg.status == status)
}
