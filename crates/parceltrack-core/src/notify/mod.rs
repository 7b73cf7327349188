use crate::models::{ParcelRecord, ParcelStatus, TrackingError, UserId};

pub type NotifyResult<T> = Result<T, TrackingError>;

/// Best-effort notification dispatch keyed by (owner, parcel, transition).
/// Callers never rely on the return value; a failing sink must not alter the
/// tracking sequence.
pub trait NotificationSink: Send + Sync {
    fn notify_status_change(
        &self,
        owner: UserId,
        parcel: &ParcelRecord,
        old_status: ParcelStatus,
        new_status: ParcelStatus,
    ) -> NotifyResult<()>;

    fn notify_location_change(
        &self,
        owner: UserId,
        parcel: &ParcelRecord,
        old_location: Option<&str>,
        new_location: &str,
    ) -> NotifyResult<()>;
}

/// Drops every notification. Deployments that disable email dispatch (for
/// example under provider rate limits) keep tracking running with this sink.
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify_status_change(
        &self,
        _owner: UserId,
        _parcel: &ParcelRecord,
        _old_status: ParcelStatus,
        _new_status: ParcelStatus,
    ) -> NotifyResult<()> {
        Ok(())
    }

    fn notify_location_change(
        &self,
        _owner: UserId,
        _parcel: &ParcelRecord,
        _old_location: Option<&str>,
        _new_location: &str,
    ) -> NotifyResult<()> {
        Ok(())
    }
}

/// Writes each notification as a structured log line instead of dispatching
/// email.
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify_status_change(
        &self,
        owner: UserId,
        parcel: &ParcelRecord,
        old_status: ParcelStatus,
        new_status: ParcelStatus,
    ) -> NotifyResult<()> {
        tracing::info!(
            owner = owner.0,
            parcel_id = parcel.id.0,
            old_status = ?old_status,
            new_status = ?new_status,
            "parcel status changed"
        );
        Ok(())
    }

    fn notify_location_change(
        &self,
        owner: UserId,
        parcel: &ParcelRecord,
        old_location: Option<&str>,
        new_location: &str,
    ) -> NotifyResult<()> {
        tracing::info!(
            owner = owner.0,
            parcel_id = parcel.id.0,
            old_location = old_location.unwrap_or("Not set"),
            new_location,
            "parcel location changed"
        );
        Ok(())
    }
}
