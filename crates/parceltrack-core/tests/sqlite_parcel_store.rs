use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parceltrack_core::models::{
    NewTransitionRecord, ParcelId, ParcelRecord, ParcelStatus, ParcelUpdate, TrackingErrorKind,
    UserId,
};
use parceltrack_core::persistence::{ParcelStore, TransitionStore};
use parceltrack_core::sqlite::SqliteParcelStore;

fn test_db_path(test_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("parceltrack-{test_name}-{nanos}.sqlite3"))
}

fn migrated_store(test_name: &str) -> SqliteParcelStore {
    let store = SqliteParcelStore::new(test_db_path(test_name));
    store.migrate_to_latest().unwrap();
    store
}

fn sample_record(parcel_id: ParcelId) -> ParcelRecord {
    // Whole seconds only; the store persists unix-second columns.
    let created_at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    ParcelRecord::new(parcel_id, UserId(21), created_at)
        .description("Laptop charger")
        .destination("Thika Town Center")
        .cost(450.0)
}

#[test]
fn parcel_roundtrip_preserves_all_columns() {
    let store = migrated_store("parcel-roundtrip");
    let record = sample_record(ParcelId(1));

    store.create_parcel(&record).unwrap();
    let loaded = store.get_parcel(ParcelId(1)).unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn get_parcel_returns_none_for_unknown_ids() {
    let store = migrated_store("parcel-unknown");
    assert!(store.get_parcel(ParcelId(5)).unwrap().is_none());
    assert!(store.owner_of(ParcelId(5)).unwrap().is_none());
}

#[test]
fn partial_update_leaves_absent_columns_untouched() {
    let store = migrated_store("parcel-partial-update");
    let record = sample_record(ParcelId(2));
    store.create_parcel(&record).unwrap();

    let first_touch = record.created_at + Duration::from_secs(30);
    store
        .update_parcel(
            ParcelId(2),
            &ParcelUpdate::at(first_touch).location("Warehouse - Sorting Center"),
        )
        .unwrap();

    let second_touch = record.created_at + Duration::from_secs(60);
    store
        .update_parcel(
            ParcelId(2),
            &ParcelUpdate::at(second_touch).status(ParcelStatus::InTransit),
        )
        .unwrap();

    let loaded = store.get_parcel(ParcelId(2)).unwrap().unwrap();
    assert_eq!(loaded.status, ParcelStatus::InTransit);
    assert_eq!(
        loaded.current_location.as_deref(),
        Some("Warehouse - Sorting Center")
    );
    assert_eq!(loaded.updated_at, second_touch);
    assert_eq!(loaded.description.as_deref(), Some("Laptop charger"));
}

#[test]
fn updating_a_missing_parcel_is_not_found() {
    let store = migrated_store("parcel-update-missing");
    let error = store
        .update_parcel(
            ParcelId(9),
            &ParcelUpdate::at(SystemTime::now()).status(ParcelStatus::InTransit),
        )
        .unwrap_err();
    assert_eq!(error.kind, TrackingErrorKind::NotFound);
    assert_eq!(error.parcel, Some(ParcelId(9)));
}

#[test]
fn owner_lookup_resolves_the_notification_recipient() {
    let store = migrated_store("parcel-owner");
    store.create_parcel(&sample_record(ParcelId(3))).unwrap();
    assert_eq!(store.owner_of(ParcelId(3)).unwrap(), Some(UserId(21)));
}

#[test]
fn transition_history_lists_newest_first_with_a_limit() {
    let store = migrated_store("parcel-transitions");
    store.create_parcel(&sample_record(ParcelId(4))).unwrap();

    let base = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    for (index, location) in ["Warehouse - Sorting Center", "Loading Dock - Ready for Pickup"]
        .iter()
        .enumerate()
    {
        store
            .append_transition(&NewTransitionRecord {
                parcel_id: ParcelId(4),
                old_status: Some(ParcelStatus::Pending),
                new_status: ParcelStatus::Pending,
                old_location: None,
                new_location: Some(location.to_string()),
                recorded_at: base + Duration::from_secs(30 * (index as u64 + 1)),
            })
            .unwrap();
    }

    let all = store.list_transitions(ParcelId(4), 10).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(
        all[0].new_location.as_deref(),
        Some("Loading Dock - Ready for Pickup")
    );

    let limited = store.list_transitions(ParcelId(4), 1).unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].new_location, all[0].new_location);
}

#[test]
fn operations_fail_before_migrations_are_applied() {
    let store = SqliteParcelStore::new(test_db_path("parcel-unmigrated"));
    let error = store.create_parcel(&sample_record(ParcelId(6))).unwrap_err();
    assert_eq!(error.kind, TrackingErrorKind::StorageFailure);
}
