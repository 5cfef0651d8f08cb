// libs/shared/models/src/scheduling.rs
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// TIME INTERVALS
// ==============================================================================

/// A concrete half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test: `[a,b)` and `[c,d)` overlap iff `a < d && c < b`.
    /// Back-to-back intervals (`b == c`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within this interval.
    pub fn covers(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
            && self.start.second() == 0
            && self.start.nanosecond() == 0
            && self.end.second() == 0
            && self.end.nanosecond() == 0
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

// ==============================================================================
// RESOURCES & AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Doctor,
    Room,
    Equipment,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Doctor => write!(f, "doctor"),
            ResourceKind::Room => write!(f, "room"),
            ResourceKind::Equipment => write!(f, "equipment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Active,
    Suspended,
}

/// A weekly recurring availability window. `day_of_week` runs 0 (Sunday)
/// through 6 (Saturday), matching the hospital admin tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
}

/// A schedulable hospital asset. Resources are never hard-deleted while
/// bookings reference them; they are suspended instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub kind: ResourceKind,
    pub name: String,
    pub status: ResourceStatus,
    pub availability: Vec<AvailabilityRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn is_active(&self) -> bool {
        self.status == ResourceStatus::Active
    }
}

/// A concrete window materialized from an `AvailabilityRule` for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub slot_minutes: i32,
}

impl AvailabilityWindow {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

// ==============================================================================
// BOOKINGS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A reservation of one resource for one interval. The interval never
/// mutates after confirmation; callers cancel and rebook instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub resource_id: Uuid,
    /// Opaque account reference supplied by the external identity service.
    pub requester: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

// ==============================================================================
// OUTBOX EVENTS
// ==============================================================================

pub const OUTBOX_SCHEMA_VERSION: i16 = 1;

/// Fixed, versioned payload per event kind. Subscribers deduplicate by
/// `OutboxEvent::event_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    BookingConfirmed {
        requester: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    BookingCancelled {
        cancelled_by: String,
    },
    BookingCompleted {},
}

impl EventPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::BookingConfirmed { .. } => "booking_confirmed",
            EventPayload::BookingCancelled { .. } => "booking_cancelled",
            EventPayload::BookingCompleted {} => "booking_completed",
        }
    }
}

/// Immutable record appended exactly once per committed state transition.
/// `sequence` is assigned by the store and is strictly increasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub event_id: Uuid,
    pub sequence: u64,
    pub schema_version: i16,
    pub booking_id: Uuid,
    pub resource_id: Uuid,
    pub payload: EventPayload,
    pub occurred_at: DateTime<Utc>,
}

impl OutboxEvent {
    pub fn new(booking: &Booking, payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            sequence: 0, // assigned on append
            schema_version: OUTBOX_SCHEMA_VERSION,
            booking_id: booking.id,
            resource_id: booking.resource_id,
            payload,
            occurred_at: Utc::now(),
        }
    }
}
