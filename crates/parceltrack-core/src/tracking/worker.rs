use std::sync::Arc;
use std::time::SystemTime;

use crate::journey;
use crate::models::{
    NewTransitionRecord, ParcelId, ParcelRecord, ParcelStatus, ParcelUpdate, TrackingError,
};
use crate::notify::NotificationSink;
use crate::persistence::{ParcelStore, TransitionStore};
use crate::tracking::{TrackingConfig, TrackingResult};

/// Everything a worker needs to drive one parcel through the journey table.
pub(crate) struct WorkerContext {
    pub parcel_id: ParcelId,
    pub store: Arc<dyn ParcelStore>,
    pub transitions: Option<Arc<dyn TransitionStore>>,
    pub sink: Arc<dyn NotificationSink>,
    pub config: TrackingConfig,
}

/// Drives one parcel through the full journey script, persisting every step.
///
/// The worker keeps the row snapshot it loaded at start and never re-reads
/// the record between steps, so an externally cancelled parcel keeps
/// receiving simulated writes until the script ends. Completion is observed
/// only through the persisted parcel state; there is no return value.
pub(crate) async fn run(ctx: WorkerContext) {
    let mut current = match load_parcel(ctx.store.clone(), ctx.parcel_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::warn!(
                parcel_id = ctx.parcel_id.0,
                "tracking worker started for unknown parcel; exiting"
            );
            return;
        }
        Err(error) => {
            tracing::error!(
                parcel_id = ctx.parcel_id.0,
                kind = ?error.kind,
                message = %error.message,
                "tracking worker failed to load parcel; exiting"
            );
            return;
        }
    };

    for leg in journey::journey() {
        let delay = ctx.config.step_delay(leg.status);
        for location in leg.locations {
            apply_step(&ctx, &mut current, leg.status, location).await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Persists one journey step. A failed write is logged and skipped; the
/// local snapshot only advances after a successful commit, and the sequence
/// continues either way.
async fn apply_step(
    ctx: &WorkerContext,
    current: &mut ParcelRecord,
    status: ParcelStatus,
    location: &str,
) {
    let now = SystemTime::now();
    let update = ParcelUpdate::at(now).status(status).location(location);

    if let Err(error) = persist_step(ctx.store.clone(), ctx.parcel_id, update).await {
        tracing::error!(
            parcel_id = ctx.parcel_id.0,
            status = ?status,
            location,
            kind = ?error.kind,
            message = %error.message,
            "failed to persist tracking step; continuing"
        );
        return;
    }

    let old_status = current.status;
    let old_location = current.current_location.take();

    current.status = status;
    current.current_location = Some(location.to_string());
    current.updated_at = now;

    if let Some(transitions) = &ctx.transitions {
        let record = NewTransitionRecord {
            parcel_id: ctx.parcel_id,
            old_status: Some(old_status),
            new_status: status,
            old_location: old_location.clone(),
            new_location: Some(location.to_string()),
            recorded_at: now,
        };
        if let Err(error) = append_transition(transitions.clone(), record).await {
            tracing::warn!(
                parcel_id = ctx.parcel_id.0,
                kind = ?error.kind,
                message = %error.message,
                "failed to record parcel transition"
            );
        }
    }

    // Notifications are best effort; a failing sink never alters the journey.
    if old_status != status
        && let Err(error) =
            ctx.sink
                .notify_status_change(current.owner, current, old_status, status)
    {
        tracing::debug!(
            parcel_id = ctx.parcel_id.0,
            message = %error.message,
            "status notification failed"
        );
    }
    if old_location.as_deref() != Some(location)
        && let Err(error) = ctx.sink.notify_location_change(
            current.owner,
            current,
            old_location.as_deref(),
            location,
        )
    {
        tracing::debug!(
            parcel_id = ctx.parcel_id.0,
            message = %error.message,
            "location notification failed"
        );
    }
}

async fn load_parcel(
    store: Arc<dyn ParcelStore>,
    parcel_id: ParcelId,
) -> TrackingResult<Option<ParcelRecord>> {
    tokio::task::spawn_blocking(move || store.get_parcel(parcel_id))
        .await
        .map_err(|join_error| {
            TrackingError::internal(format!("parcel load join failure: {join_error}"))
        })?
}

async fn persist_step(
    store: Arc<dyn ParcelStore>,
    parcel_id: ParcelId,
    update: ParcelUpdate,
) -> TrackingResult<()> {
    tokio::task::spawn_blocking(move || store.update_parcel(parcel_id, &update))
        .await
        .map_err(|join_error| {
            TrackingError::internal(format!("step persistence join failure: {join_error}"))
        })?
}

async fn append_transition(
    transitions: Arc<dyn TransitionStore>,
    record: NewTransitionRecord,
) -> TrackingResult<()> {
    tokio::task::spawn_blocking(move || transitions.append_transition(&record))
        .await
        .map_err(|join_error| {
            TrackingError::internal(format!("transition persistence join failure: {join_error}"))
        })?
}
