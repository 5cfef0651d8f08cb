pub mod memory;
pub mod retry;

pub use memory::MemoryStore;
pub use retry::{with_backoff, RetryPolicy};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use shared_models::{Booking, OutboxEvent, Resource};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("booking overlaps an existing confirmed booking")]
    OverlapViolation,

    #[error("transient storage failure: {0}")]
    Transient(String),

    #[error("storage failure: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Persistence handle owned by the services that mutate schedule state.
/// Injected at construction; there is no process-wide implicit store.
///
/// `commit_booking` and `transition_booking` are single durability
/// boundaries: the booking write and the outbox append happen together or
/// not at all, so a committed transition always yields exactly one event.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn insert_resource(&self, resource: Resource) -> Result<(), StoreError>;
    async fn resource(&self, id: Uuid) -> Result<Resource, StoreError>;
    async fn update_resource(&self, resource: Resource) -> Result<(), StoreError>;
    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError>;

    async fn booking(&self, id: Uuid) -> Result<Booking, StoreError>;

    /// Confirmed bookings for a resource whose start time falls in
    /// `[from, to)`, ordered by start time. This is the bounded scan the
    /// conflict detector relies on.
    async fn confirmed_bookings_in_window(
        &self,
        resource_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Insert a new booking and append its event atomically. Implementations
    /// must re-verify the confirmed-interval non-overlap invariant inside
    /// the same isolation scope and refuse with `OverlapViolation` if it
    /// would be broken.
    async fn commit_booking(
        &self,
        booking: Booking,
        event: OutboxEvent,
    ) -> Result<OutboxEvent, StoreError>;

    /// Persist a status transition of an existing booking and append its
    /// event atomically.
    async fn transition_booking(
        &self,
        booking: Booking,
        event: OutboxEvent,
    ) -> Result<OutboxEvent, StoreError>;

    /// Events with sequence strictly greater than `after`, oldest first.
    async fn events_after(&self, after: u64, limit: usize) -> Result<Vec<OutboxEvent>, StoreError>;

    /// Per-resource mutual-exclusion scope. Callers hold the guard across
    /// check-then-commit; calls for different resources share no lock.
    fn resource_lock(&self, resource_id: Uuid) -> Arc<Mutex<()>>;
}
