// libs/scheduling-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Booking, TimeInterval};
use shared_store::{ScheduleStore, StoreError};

/// Detects overlaps between a candidate interval and confirmed bookings.
///
/// The scan is bounded: because no booking may run longer than
/// `max_booking_hours`, any confirmed booking that overlaps the candidate
/// must START within `[candidate.start - max_booking_hours,
/// candidate.end)`. Everything outside that window is skipped without
/// inspection.
pub struct ConflictDetector {
    store: Arc<dyn ScheduleStore>,
    max_booking_hours: i64,
}

impl ConflictDetector {
    pub fn new(store: Arc<dyn ScheduleStore>, max_booking_hours: i64) -> Self {
        Self {
            store,
            max_booking_hours,
        }
    }

    /// Confirmed bookings whose interval overlaps `interval`, ordered by
    /// start time.
    pub async fn find_conflicts(
        &self,
        resource_id: Uuid,
        interval: TimeInterval,
    ) -> Result<Vec<Booking>, StoreError> {
        let scan_from = interval.start - Duration::hours(self.max_booking_hours);

        let candidates = self
            .store
            .confirmed_bookings_in_window(resource_id, scan_from, interval.end)
            .await?;

        debug!(
            "Conflict scan for resource {} over {}: {} candidates",
            resource_id,
            interval,
            candidates.len()
        );

        Ok(candidates
            .into_iter()
            .filter(|b| b.interval().overlaps(&interval))
            .collect())
    }

    pub async fn has_conflict(
        &self,
        resource_id: Uuid,
        interval: TimeInterval,
    ) -> Result<bool, StoreError> {
        Ok(!self.find_conflicts(resource_id, interval).await?.is_empty())
    }
}
