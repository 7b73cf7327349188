use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parceltrack_core::models::{EstimatedDelivery, ParcelStatus};
use parceltrack_core::tracking::estimated_delivery;

const HOUR: Duration = Duration::from_secs(60 * 60);

fn fixed_now() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

#[test]
fn delivered_parcels_report_the_literal_string() {
    let estimate = estimated_delivery(ParcelStatus::Delivered, fixed_now());
    assert_eq!(estimate, EstimatedDelivery::Delivered);
    assert_eq!(estimate.to_string(), "Delivered");
    assert_eq!(
        serde_json::to_value(estimate).unwrap(),
        serde_json::json!("Delivered")
    );
}

#[test]
fn pending_parcels_are_estimated_two_hours_out() {
    let now = fixed_now();
    assert_eq!(
        estimated_delivery(ParcelStatus::Pending, now),
        EstimatedDelivery::At(now + 2 * HOUR)
    );
}

#[test]
fn in_transit_parcels_are_estimated_one_hour_out() {
    let now = fixed_now();
    assert_eq!(
        estimated_delivery(ParcelStatus::InTransit, now),
        EstimatedDelivery::At(now + HOUR)
    );
}

#[test]
fn cancelled_parcels_keep_the_legacy_three_hour_fallback() {
    let now = fixed_now();
    assert_eq!(
        estimated_delivery(ParcelStatus::Cancelled, now),
        EstimatedDelivery::At(now + 3 * HOUR)
    );
}

#[test]
fn non_delivered_estimates_are_strictly_in_the_future() {
    for status in [
        ParcelStatus::Pending,
        ParcelStatus::InTransit,
        ParcelStatus::Cancelled,
    ] {
        let now = SystemTime::now();
        match estimated_delivery(status, now) {
            EstimatedDelivery::At(when) => {
                assert!(when > now, "estimate for {status:?} is not in the future")
            }
            EstimatedDelivery::Delivered => panic!("{status:?} must not report Delivered"),
        }
    }
}

#[test]
fn estimates_track_the_query_time_rather_than_being_cached() {
    let first = fixed_now();
    let second = first + Duration::from_secs(90);
    assert_ne!(
        estimated_delivery(ParcelStatus::Pending, first),
        estimated_delivery(ParcelStatus::Pending, second)
    );
}

#[test]
fn timestamp_estimates_format_as_minute_precision_utc() {
    // 2023-11-14 22:13:20 UTC
    let estimate = EstimatedDelivery::At(fixed_now());
    assert_eq!(estimate.to_string(), "2023-11-14 22:13");
}
