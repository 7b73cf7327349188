use std::sync::{Arc, Mutex};
use std::time::{Duration, UNIX_EPOCH};

use parceltrack_core::models::{
    ParcelId, ParcelRecord, ParcelStatus, TrackingError, TrackingErrorKind, UserId,
};
use parceltrack_core::notify::{NotificationSink, NotifyResult};
use parceltrack_core::persistence::{InMemoryParcelStore, ParcelStore};
use parceltrack_core::tracking::{TrackingConfig, TrackingSupervisor};

const JOURNEY_STEPS: usize = 11;

#[derive(Clone, Debug, PartialEq)]
enum Notification {
    Status(ParcelStatus, ParcelStatus),
    Location(Option<String>, String),
}

#[derive(Default)]
struct RecordingSink {
    notifications: Mutex<Vec<(UserId, Notification)>>,
}

impl RecordingSink {
    fn notifications(&self) -> Vec<(UserId, Notification)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify_status_change(
        &self,
        owner: UserId,
        _parcel: &ParcelRecord,
        old_status: ParcelStatus,
        new_status: ParcelStatus,
    ) -> NotifyResult<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((owner, Notification::Status(old_status, new_status)));
        Ok(())
    }

    fn notify_location_change(
        &self,
        owner: UserId,
        _parcel: &ParcelRecord,
        old_location: Option<&str>,
        new_location: &str,
    ) -> NotifyResult<()> {
        self.notifications.lock().unwrap().push((
            owner,
            Notification::Location(old_location.map(str::to_string), new_location.to_string()),
        ));
        Ok(())
    }
}

/// Rejects every notification, standing in for an email provider outage.
struct FailingSink;

impl NotificationSink for FailingSink {
    fn notify_status_change(
        &self,
        _owner: UserId,
        parcel: &ParcelRecord,
        _old_status: ParcelStatus,
        _new_status: ParcelStatus,
    ) -> NotifyResult<()> {
        Err(TrackingError {
            parcel: Some(parcel.id),
            kind: TrackingErrorKind::NotificationFailure,
            message: "email provider rejected the message".to_string(),
        })
    }

    fn notify_location_change(
        &self,
        _owner: UserId,
        parcel: &ParcelRecord,
        _old_location: Option<&str>,
        _new_location: &str,
    ) -> NotifyResult<()> {
        Err(TrackingError {
            parcel: Some(parcel.id),
            kind: TrackingErrorKind::NotificationFailure,
            message: "email provider rejected the message".to_string(),
        })
    }
}

fn fast_config() -> TrackingConfig {
    TrackingConfig {
        pending_step_delay: Duration::from_millis(5),
        in_transit_step_delay: Duration::from_millis(5),
    }
}

fn seeded_store(parcel_id: ParcelId, owner: UserId) -> Arc<InMemoryParcelStore> {
    let store = Arc::new(InMemoryParcelStore::new());
    let created_at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    store
        .create_parcel(&ParcelRecord::new(parcel_id, owner, created_at))
        .unwrap();
    store
}

async fn wait_for_delivery(store: &InMemoryParcelStore, parcel_id: ParcelId) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let status = store.get_parcel(parcel_id).unwrap().map(|r| r.status);
        if status == Some(ParcelStatus::Delivered) {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "journey did not finish, last status {status:?}"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[tokio::test]
async fn each_transition_notifies_the_parcel_owner() {
    let parcel_id = ParcelId(20);
    let owner = UserId(77);
    let store = seeded_store(parcel_id, owner);
    let sink = Arc::new(RecordingSink::default());

    let supervisor = TrackingSupervisor::with_config(store.clone(), sink.clone(), fast_config());
    supervisor.start_tracking(parcel_id).await;
    wait_for_delivery(store.as_ref(), parcel_id).await;

    let notifications = sink.notifications();
    assert!(notifications.iter().all(|(user, _)| *user == owner));

    let status_changes: Vec<&Notification> = notifications
        .iter()
        .filter(|(_, n)| matches!(n, Notification::Status(_, _)))
        .map(|(_, n)| n)
        .collect();
    // The journey crosses two status boundaries; same-status steps stay quiet.
    assert_eq!(
        status_changes,
        vec![
            &Notification::Status(ParcelStatus::Pending, ParcelStatus::InTransit),
            &Notification::Status(ParcelStatus::InTransit, ParcelStatus::Delivered),
        ]
    );

    let location_changes = notifications
        .iter()
        .filter(|(_, n)| matches!(n, Notification::Location(_, _)))
        .count();
    assert_eq!(location_changes, JOURNEY_STEPS);

    let first_location = notifications
        .iter()
        .find_map(|(_, n)| match n {
            Notification::Location(old, new) => Some((old.clone(), new.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        first_location,
        (None, "Warehouse - Sorting Center".to_string())
    );
}

#[tokio::test]
async fn a_failing_sink_never_stalls_the_journey() {
    let parcel_id = ParcelId(21);
    let store = seeded_store(parcel_id, UserId(77));

    let supervisor =
        TrackingSupervisor::with_config(store.clone(), Arc::new(FailingSink), fast_config());
    supervisor.start_tracking(parcel_id).await;
    wait_for_delivery(store.as_ref(), parcel_id).await;

    let record = store.get_parcel(parcel_id).unwrap().unwrap();
    assert_eq!(record.status, ParcelStatus::Delivered);
    assert_eq!(
        record.current_location.as_deref(),
        Some("Delivered to recipient")
    );
}
