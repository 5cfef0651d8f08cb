// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::BookingStatus;
use shared_store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub resource_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub resource_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictQuery {
    pub resource_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A bookable opening derived from an availability window, minus the
/// intervals already taken by confirmed bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub conflict: bool,
    pub conflicting_booking_ids: Vec<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Resource is suspended and cannot accept bookings")]
    ResourceSuspended,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Invalid booking interval: {0}")]
    InvalidInterval(String),

    #[error("Requested interval overlaps an existing confirmed booking")]
    Conflict,

    #[error("Booking is already in a terminal state")]
    AlreadyTerminal,

    #[error("Only confirmed bookings can be completed")]
    NotConfirmed,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Transient storage failure: {0}")]
    TransientStorage(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl BookingError {
    /// Retryable at the persistence boundary; every other variant is a
    /// definitive answer and must surface immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, BookingError::TransientStorage(_))
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OverlapViolation => BookingError::Conflict,
            StoreError::Transient(msg) => BookingError::TransientStorage(msg),
            StoreError::NotFound => BookingError::Storage("record not found".to_string()),
            StoreError::Internal(msg) => BookingError::Storage(msg),
        }
    }
}
