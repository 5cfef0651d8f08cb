// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use resource_cell::windows_in_range;
use shared_config::AppConfig;
use shared_models::{
    Booking, BookingStatus, EventPayload, OutboxEvent, Resource, TimeInterval,
};
use shared_store::{with_backoff, RetryPolicy, ScheduleStore, StoreError};

use crate::models::{BookableSlot, BookingError, ConflictReport};
use crate::services::conflict::ConflictDetector;
use crate::services::lifecycle::validate_transition;
use crate::services::slots::{covers, expand_free_slots};

/// Orchestrates the booking lifecycle: validation, coverage and conflict
/// checks, and the atomic commit of a booking plus its outbox event.
///
/// Per-resource mutual exclusion is acquired from the store and held across
/// the whole check-then-commit unit, so two requests for the same resource
/// never interleave between the conflict check and the write. Transient
/// storage failures re-run the entire unit under a fresh lock acquisition;
/// stale check results are never reused.
pub struct BookingEngine {
    store: Arc<dyn ScheduleStore>,
    detector: ConflictDetector,
    max_booking_hours: i64,
    retry: RetryPolicy,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn ScheduleStore>, config: &AppConfig) -> Self {
        let detector = ConflictDetector::new(store.clone(), config.max_booking_hours);
        Self {
            store,
            detector,
            max_booking_hours: config.max_booking_hours,
            retry: RetryPolicy::new(config.storage_retry_attempts, config.storage_retry_base_ms),
        }
    }

    /// Book `interval` on a resource for `requester`. On success the booking
    /// is committed directly to confirmed together with exactly one
    /// `booking_confirmed` event.
    pub async fn request_booking(
        &self,
        resource_id: Uuid,
        requester: &str,
        interval: TimeInterval,
    ) -> Result<Booking, BookingError> {
        self.validate_interval(interval)?;

        with_backoff(self.retry, "request_booking", BookingError::is_transient, || {
            self.try_commit_booking(resource_id, requester, interval)
        })
        .await
    }

    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        actor: &str,
    ) -> Result<Booking, BookingError> {
        with_backoff(self.retry, "cancel_booking", BookingError::is_transient, || {
            self.try_transition(
                booking_id,
                BookingStatus::Cancelled,
                EventPayload::BookingCancelled {
                    cancelled_by: actor.to_string(),
                },
            )
        })
        .await
    }

    /// Mark a confirmed booking as carried out. Gated purely on status;
    /// staff may complete a booking whenever the work actually happened.
    pub async fn complete_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        with_backoff(self.retry, "complete_booking", BookingError::is_transient, || {
            self.try_transition(
                booking_id,
                BookingStatus::Completed,
                EventPayload::BookingCompleted {},
            )
        })
        .await
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        match self.store.booking(booking_id).await {
            Ok(b) => Ok(b),
            Err(StoreError::NotFound) => Err(BookingError::BookingNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Free slots for a resource in `[from, to)`: availability windows
    /// stepped by their slot size, minus anything a confirmed booking
    /// overlaps.
    pub async fn available_slots(
        &self,
        resource_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BookableSlot>, BookingError> {
        if from >= to {
            return Err(BookingError::InvalidInterval(
                "'from' must be before 'to'".to_string(),
            ));
        }

        let resource = self.fetch_resource(resource_id).await?;
        let windows = windows_in_range(&resource, from, to);
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        // Scan back far enough to catch confirmed bookings that start
        // before the range but run into it; a booking can occupy at most
        // max_booking_hours before `from`.
        let scan_from = from - Duration::hours(self.max_booking_hours);
        let confirmed = self
            .store
            .confirmed_bookings_in_window(resource_id, scan_from, to)
            .await?;

        Ok(expand_free_slots(&windows, &confirmed))
    }

    /// Advisory conflict probe. The answer can be stale by the time the
    /// caller acts on it; `request_booking` always re-checks under the lock.
    pub async fn check_conflict(
        &self,
        resource_id: Uuid,
        interval: TimeInterval,
    ) -> Result<ConflictReport, BookingError> {
        self.validate_interval(interval)?;
        self.fetch_resource(resource_id).await?;

        let conflicts = self.detector.find_conflicts(resource_id, interval).await?;
        Ok(ConflictReport {
            conflict: !conflicts.is_empty(),
            conflicting_booking_ids: conflicts.into_iter().map(|b| b.id).collect(),
        })
    }

    async fn try_commit_booking(
        &self,
        resource_id: Uuid,
        requester: &str,
        interval: TimeInterval,
    ) -> Result<Booking, BookingError> {
        let lock = self.store.resource_lock(resource_id);
        let _guard = lock.lock().await;

        // Read the resource under the lock so a concurrent suspension or
        // rule edit cannot slip in between the check and the commit.
        let resource = self.fetch_resource(resource_id).await?;
        if !resource.is_active() {
            return Err(BookingError::ResourceSuspended);
        }

        // Coverage first: an interval outside availability is rejected
        // before any conflict scan runs.
        self.check_coverage(&resource, interval)?;

        if self.detector.has_conflict(resource_id, interval).await? {
            info!(
                "Rejecting booking on resource {}: {} overlaps a confirmed booking",
                resource_id, interval
            );
            return Err(BookingError::Conflict);
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            resource_id,
            requester: requester.to_string(),
            start_time: interval.start,
            end_time: interval.end,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };
        let event = OutboxEvent::new(
            &booking,
            EventPayload::BookingConfirmed {
                requester: booking.requester.clone(),
                start_time: booking.start_time,
                end_time: booking.end_time,
            },
        );

        self.store.commit_booking(booking.clone(), event).await?;
        info!(
            "Confirmed booking {} on resource {} for {}",
            booking.id, resource_id, interval
        );
        Ok(booking)
    }

    async fn try_transition(
        &self,
        booking_id: Uuid,
        to: BookingStatus,
        payload: EventPayload,
    ) -> Result<Booking, BookingError> {
        let mut booking = self.get_booking(booking_id).await?;

        let lock = self.store.resource_lock(booking.resource_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent transition may have landed.
        booking = self.get_booking(booking_id).await?;
        validate_transition(booking.status, to)?;

        booking.status = to;
        booking.updated_at = Utc::now();

        let event = OutboxEvent::new(&booking, payload);
        self.store.transition_booking(booking.clone(), event).await?;
        info!("Booking {} moved to {}", booking.id, to);
        Ok(booking)
    }

    async fn fetch_resource(&self, resource_id: Uuid) -> Result<Resource, BookingError> {
        match self.store.resource(resource_id).await {
            Ok(r) => Ok(r),
            Err(StoreError::NotFound) => Err(BookingError::ResourceNotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn validate_interval(&self, interval: TimeInterval) -> Result<(), BookingError> {
        if !interval.is_well_formed() {
            return Err(BookingError::InvalidInterval(
                "interval must have start before end, on whole minutes".to_string(),
            ));
        }
        if interval.duration_minutes() > self.max_booking_hours * 60 {
            return Err(BookingError::InvalidInterval(format!(
                "booking cannot exceed {} hours",
                self.max_booking_hours
            )));
        }
        Ok(())
    }

    fn check_coverage(
        &self,
        resource: &Resource,
        interval: TimeInterval,
    ) -> Result<(), BookingError> {
        if !covers(resource, interval) {
            warn!(
                "Booking interval {} falls outside availability of resource {}",
                interval, resource.id
            );
            return Err(BookingError::InvalidInterval(
                "interval is not covered by the resource's availability".to_string(),
            ));
        }
        Ok(())
    }
}
