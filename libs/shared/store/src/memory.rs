// libs/shared/store/src/memory.rs
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use shared_models::{Booking, BookingStatus, OutboxEvent, Resource};

use crate::{ScheduleStore, StoreError};

#[derive(Default)]
struct State {
    resources: HashMap<Uuid, Resource>,
    bookings: HashMap<Uuid, Booking>,
    /// Per-resource index of booking ids keyed by start time, backing the
    /// bounded conflict-window scan.
    by_resource: HashMap<Uuid, BTreeMap<(DateTime<Utc>, Uuid), Uuid>>,
    outbox: Vec<OutboxEvent>,
    next_sequence: u64,
}

/// In-memory schedule store. All mutations run inside one write section, so
/// a booking write and its outbox append form a single durability boundary.
pub struct MemoryStore {
    state: RwLock<State>,
    locks: std::sync::Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    window_scans: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_sequence: 1,
                ..State::default()
            }),
            locks: std::sync::Mutex::new(HashMap::new()),
            window_scans: AtomicU64::new(0),
        }
    }

    /// Number of conflict-window scans served. Test probe for verifying
    /// that validation rejections never reach conflict detection.
    pub fn window_scan_count(&self) -> u64 {
        self.window_scans.load(Ordering::Relaxed)
    }

    fn append_event(state: &mut State, mut event: OutboxEvent) -> OutboxEvent {
        event.sequence = state.next_sequence;
        state.next_sequence += 1;
        state.outbox.push(event.clone());
        event
    }

    fn has_confirmed_overlap(state: &State, booking: &Booking) -> bool {
        let Some(index) = state.by_resource.get(&booking.resource_id) else {
            return false;
        };
        index.values().any(|id| {
            state
                .bookings
                .get(id)
                .map(|existing| {
                    existing.id != booking.id
                        && existing.status == BookingStatus::Confirmed
                        && existing.interval().overlaps(&booking.interval())
                })
                .unwrap_or(false)
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn insert_resource(&self, resource: Resource) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.resources.insert(resource.id, resource);
        Ok(())
    }

    async fn resource(&self, id: Uuid) -> Result<Resource, StoreError> {
        let state = self.state.read().await;
        state.resources.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_resource(&self, resource: Resource) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.resources.contains_key(&resource.id) {
            return Err(StoreError::NotFound);
        }
        state.resources.insert(resource.id, resource);
        Ok(())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        let state = self.state.read().await;
        let mut resources: Vec<Resource> = state.resources.values().cloned().collect();
        resources.sort_by_key(|r| r.created_at);
        Ok(resources)
    }

    async fn booking(&self, id: Uuid) -> Result<Booking, StoreError> {
        let state = self.state.read().await;
        state.bookings.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn confirmed_bookings_in_window(
        &self,
        resource_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        self.window_scans.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read().await;

        let Some(index) = state.by_resource.get(&resource_id) else {
            return Ok(vec![]);
        };

        let bookings = index
            .range((from, Uuid::nil())..(to, Uuid::nil()))
            .filter_map(|(_, id)| state.bookings.get(id))
            .filter(|b| b.status == BookingStatus::Confirmed)
            .cloned()
            .collect();

        Ok(bookings)
    }

    async fn commit_booking(
        &self,
        booking: Booking,
        event: OutboxEvent,
    ) -> Result<OutboxEvent, StoreError> {
        let mut state = self.state.write().await;

        // Backstop for the non-overlap invariant, re-checked inside the
        // write section regardless of what the caller already verified.
        if booking.status == BookingStatus::Confirmed
            && Self::has_confirmed_overlap(&state, &booking)
        {
            return Err(StoreError::OverlapViolation);
        }

        state
            .by_resource
            .entry(booking.resource_id)
            .or_default()
            .insert((booking.start_time, booking.id), booking.id);
        state.bookings.insert(booking.id, booking.clone());
        let stored = Self::append_event(&mut state, event);

        debug!(
            "Committed booking {} for resource {} (event seq {})",
            booking.id, booking.resource_id, stored.sequence
        );
        Ok(stored)
    }

    async fn transition_booking(
        &self,
        booking: Booking,
        event: OutboxEvent,
    ) -> Result<OutboxEvent, StoreError> {
        let mut state = self.state.write().await;

        if !state.bookings.contains_key(&booking.id) {
            return Err(StoreError::NotFound);
        }
        if booking.status == BookingStatus::Confirmed
            && Self::has_confirmed_overlap(&state, &booking)
        {
            return Err(StoreError::OverlapViolation);
        }

        state.bookings.insert(booking.id, booking.clone());
        let stored = Self::append_event(&mut state, event);

        debug!(
            "Booking {} transitioned to {} (event seq {})",
            booking.id, booking.status, stored.sequence
        );
        Ok(stored)
    }

    async fn events_after(&self, after: u64, limit: usize) -> Result<Vec<OutboxEvent>, StoreError> {
        let state = self.state.read().await;
        // Outbox entries are pushed in sequence order.
        let start = state.outbox.partition_point(|e| e.sequence <= after);
        Ok(state.outbox[start..]
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    fn resource_lock(&self, resource_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(resource_id).or_default())
    }
}
