pub mod estimator;
pub mod supervisor;
mod worker;

pub use estimator::estimated_delivery;
pub use supervisor::{TrackingSupervisor, TrackingTaskHandle};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{ParcelStatus, TrackingError};

pub type TrackingResult<T> = Result<T, TrackingError>;

/// Inter-step delays of the simulated journey. The location labels live in
/// the static journey table; only the pacing is configurable so tests can
/// shrink time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub pending_step_delay: Duration,
    pub in_transit_step_delay: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            pending_step_delay: Duration::from_secs(30),
            in_transit_step_delay: Duration::from_secs(120),
        }
    }
}

impl TrackingConfig {
    /// Delay observed after each step of the given status. Delivered is a
    /// single terminal step with no further delay.
    pub fn step_delay(&self, status: ParcelStatus) -> Duration {
        match status {
            ParcelStatus::Pending => self.pending_step_delay,
            ParcelStatus::InTransit => self.in_transit_step_delay,
            ParcelStatus::Delivered | ParcelStatus::Cancelled => Duration::ZERO,
        }
    }
}
