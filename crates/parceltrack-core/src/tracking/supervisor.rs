use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::models::{LiveTrackingView, ParcelId, ParcelRecord, TrackingInfo};
use crate::notify::NotificationSink;
use crate::persistence::{ParcelStore, TransitionStore};
use crate::tracking::estimator::estimated_delivery;
use crate::tracking::worker::{self, WorkerContext};
use crate::tracking::TrackingConfig;

/// Process-local bookkeeping for one running worker. Never persisted: after
/// a restart no parcel is considered actively tracking until it is started
/// again.
pub struct TrackingTaskHandle {
    pub parcel_id: ParcelId,
    worker_seq: u64,
    abort_handle: AbortHandle,
}

impl TrackingTaskHandle {
    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}

/// Single source of truth for "is parcel X being tracked" and the only
/// component that creates workers. The registry is owned by the supervisor
/// and injected nowhere else; there is no process-wide singleton.
#[derive(Clone)]
pub struct TrackingSupervisor {
    inner: Arc<SupervisorInner>,
}

struct SupervisorInner {
    store: Arc<dyn ParcelStore>,
    transitions: Option<Arc<dyn TransitionStore>>,
    sink: Arc<dyn NotificationSink>,
    config: TrackingConfig,
    registry: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    next_worker_seq: u64,
    workers: HashMap<ParcelId, TrackingTaskHandle>,
}

impl TrackingSupervisor {
    pub fn new(store: Arc<dyn ParcelStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_config(store, sink, TrackingConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ParcelStore>,
        sink: Arc<dyn NotificationSink>,
        config: TrackingConfig,
    ) -> Self {
        Self::with_transition_store(store, None, sink, config)
    }

    pub fn with_transition_store(
        store: Arc<dyn ParcelStore>,
        transitions: Option<Arc<dyn TransitionStore>>,
        sink: Arc<dyn NotificationSink>,
        config: TrackingConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SupervisorInner {
                store,
                transitions,
                sink,
                config,
                registry: Mutex::new(RegistryState::default()),
            }),
        }
    }

    /// Launches a worker for `parcel_id` unless one is already registered.
    /// Check-then-launch happens under the registry lock, so at most one
    /// worker ever exists per parcel. Returns immediately; a duplicate start
    /// is a silent no-op.
    pub async fn start_tracking(&self, parcel_id: ParcelId) {
        let mut registry = self.inner.registry.lock().await;
        if registry.workers.contains_key(&parcel_id) {
            return;
        }

        let worker_seq = registry.next_worker_seq;
        registry.next_worker_seq = registry.next_worker_seq.saturating_add(1);

        let ctx = WorkerContext {
            parcel_id,
            store: self.inner.store.clone(),
            transitions: self.inner.transitions.clone(),
            sink: self.inner.sink.clone(),
            config: self.inner.config,
        };

        let inner = self.inner.clone();
        let join_handle = tokio::spawn(async move {
            worker::run(ctx).await;
            // Deregister our own handle on completion. The sequence check
            // keeps a stop-then-restart successor's entry intact.
            let mut registry = inner.registry.lock().await;
            let same_worker = registry
                .workers
                .get(&parcel_id)
                .is_some_and(|handle| handle.worker_seq == worker_seq);
            if same_worker {
                registry.workers.remove(&parcel_id);
            }
        });

        registry.workers.insert(
            parcel_id,
            TrackingTaskHandle {
                parcel_id,
                worker_seq,
                abort_handle: join_handle.abort_handle(),
            },
        );
    }

    /// Point-in-time tracking snapshot for a parcel, or `None` when no record
    /// exists (or the store read fails). Pure read: never blocks on a worker,
    /// and the delivery estimate is re-evaluated against the current time on
    /// every call.
    pub async fn get_tracking_info(&self, parcel_id: ParcelId) -> Option<TrackingInfo> {
        let record = self.load_parcel(parcel_id).await?;
        let is_tracking = self.is_tracking(parcel_id).await;
        Some(build_tracking_info(&record, is_tracking))
    }

    /// Removes the registry entry for `parcel_id`. Advisory only: an in-flight
    /// worker is not interrupted, but `is_tracking` stops reporting true and a
    /// later `start_tracking` is no longer treated as a duplicate.
    pub async fn stop_tracking(&self, parcel_id: ParcelId) {
        let mut registry = self.inner.registry.lock().await;
        registry.workers.remove(&parcel_id);
    }

    pub async fn is_tracking(&self, parcel_id: ParcelId) -> bool {
        let registry = self.inner.registry.lock().await;
        registry.workers.contains_key(&parcel_id)
    }

    pub async fn tracked_parcels(&self) -> Vec<ParcelId> {
        let registry = self.inner.registry.lock().await;
        let mut ids: Vec<ParcelId> = registry.workers.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Composite live view: the tracking snapshot merged with the parcel's
    /// raw display fields and a server-generated timestamp.
    pub async fn live_view(&self, parcel_id: ParcelId) -> Option<LiveTrackingView> {
        let record = self.load_parcel(parcel_id).await?;
        let is_tracking = self.is_tracking(parcel_id).await;
        let info = build_tracking_info(&record, is_tracking);

        Some(LiveTrackingView {
            parcel_id: info.parcel_id,
            current_location: info.current_location,
            status: info.status,
            estimated_delivery: info.estimated_delivery,
            is_tracking: info.is_tracking,
            last_updated: info.last_updated,
            description: record.description,
            destination: record.destination,
            cost: record.cost,
            created_at: DateTime::<Utc>::from(record.created_at),
            timestamp: Utc::now(),
            tracking_active: is_tracking,
        })
    }

    async fn load_parcel(&self, parcel_id: ParcelId) -> Option<ParcelRecord> {
        let store = self.inner.store.clone();
        match tokio::task::spawn_blocking(move || store.get_parcel(parcel_id)).await {
            Ok(Ok(record)) => record,
            Ok(Err(error)) => {
                tracing::error!(
                    parcel_id = parcel_id.0,
                    kind = ?error.kind,
                    message = %error.message,
                    "failed to read parcel record"
                );
                None
            }
            Err(join_error) => {
                tracing::error!(
                    parcel_id = parcel_id.0,
                    %join_error,
                    "parcel read task failed"
                );
                None
            }
        }
    }
}

fn build_tracking_info(record: &ParcelRecord, is_tracking: bool) -> TrackingInfo {
    TrackingInfo {
        parcel_id: record.id,
        current_location: record.current_location.clone(),
        status: record.status,
        estimated_delivery: estimated_delivery(record.status, SystemTime::now()),
        is_tracking,
        last_updated: DateTime::<Utc>::from(record.updated_at),
    }
}
