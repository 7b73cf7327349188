pub mod error;
pub mod parcel;
pub mod tracking;
pub mod transition;

pub use error::{TrackingError, TrackingErrorKind};
pub use parcel::{ParcelId, ParcelRecord, ParcelStatus, ParcelUpdate, UserId};
pub use tracking::{EstimatedDelivery, LiveTrackingView, TrackingInfo};
pub use transition::{NewTransitionRecord, TransitionRecord};
