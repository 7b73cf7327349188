use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::models::ParcelId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TrackingErrorKind {
    NotFound,
    StorageFailure,
    NotificationFailure,
    InvalidInput,
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackingError {
    pub parcel: Option<ParcelId>,
    pub kind: TrackingErrorKind,
    pub message: String,
}

impl TrackingError {
    pub fn not_found(parcel: ParcelId) -> Self {
        Self {
            parcel: Some(parcel),
            kind: TrackingErrorKind::NotFound,
            message: format!("no parcel record exists for id '{}'", parcel.0),
        }
    }

    pub fn storage(parcel: Option<ParcelId>, message: impl Into<String>) -> Self {
        Self {
            parcel,
            kind: TrackingErrorKind::StorageFailure,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            parcel: None,
            kind: TrackingErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl Display for TrackingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for TrackingError {}
