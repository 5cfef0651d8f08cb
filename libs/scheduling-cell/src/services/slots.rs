// libs/scheduling-cell/src/services/slots.rs
use chrono::Duration;

use resource_cell::windows_in_range;
use shared_models::{AvailabilityWindow, Booking, Resource, TimeInterval};

use crate::models::BookableSlot;

/// True iff some availability window of the resource fully contains the
/// interval. Bookings must fit within a single window.
pub fn covers(resource: &Resource, interval: TimeInterval) -> bool {
    windows_in_range(resource, interval.start, interval.end)
        .iter()
        .any(|w| w.interval().covers(&interval))
}

/// Step each availability window in `slot_minutes` increments and keep the
/// openings no confirmed booking touches. Partial slots at the tail of a
/// window are dropped rather than shortened.
pub fn expand_free_slots(
    windows: &[AvailabilityWindow],
    confirmed: &[Booking],
) -> Vec<BookableSlot> {
    let mut slots = Vec::new();

    for window in windows {
        let step = Duration::minutes(window.slot_minutes as i64);
        if step <= Duration::zero() {
            continue;
        }

        let mut cursor = window.start_time;
        while cursor + step <= window.end_time {
            let candidate = TimeInterval::new(cursor, cursor + step);
            let taken = confirmed.iter().any(|b| b.interval().overlaps(&candidate));
            if !taken {
                slots.push(BookableSlot {
                    start_time: candidate.start,
                    end_time: candidate.end,
                });
            }
            cursor += step;
        }
    }

    slots.sort_by_key(|s| s.start_time);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use shared_models::BookingStatus;
    use uuid::Uuid;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn confirmed(start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
            requester: "acct-1".to_string(),
            start_time: start,
            end_time: end,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expands_window_into_aligned_slots() {
        let windows = [AvailabilityWindow {
            start_time: at(9, 0),
            end_time: at(10, 30),
            slot_minutes: 30,
        }];

        let slots = expand_free_slots(&windows, &[]);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start_time, at(9, 0));
        assert_eq!(slots[2].end_time, at(10, 30));
    }

    #[test]
    fn drops_partial_tail_slot() {
        let windows = [AvailabilityWindow {
            start_time: at(9, 0),
            end_time: at(9, 50),
            slot_minutes: 30,
        }];

        let slots = expand_free_slots(&windows, &[]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end_time, at(9, 30));
    }

    #[test]
    fn covers_requires_a_single_containing_window() {
        use chrono::NaiveTime;
        use shared_models::{AvailabilityRule, ResourceKind, ResourceStatus};

        // 2025-06-02 is a Monday.
        let resource = Resource {
            id: Uuid::new_v4(),
            kind: ResourceKind::Doctor,
            name: "Dr. Kowalski".to_string(),
            status: ResourceStatus::Active,
            availability: vec![AvailabilityRule {
                day_of_week: 1,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                slot_minutes: 30,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(covers(&resource, TimeInterval::new(at(9, 0), at(9, 30))));
        assert!(covers(&resource, TimeInterval::new(at(16, 30), at(17, 0))));
        // Straddles the window edge.
        assert!(!covers(&resource, TimeInterval::new(at(16, 45), at(17, 15))));
        // Entirely outside.
        assert!(!covers(&resource, TimeInterval::new(at(18, 0), at(18, 30))));
    }

    #[test]
    fn excludes_slots_touched_by_confirmed_bookings() {
        let windows = [AvailabilityWindow {
            start_time: at(9, 0),
            end_time: at(11, 0),
            slot_minutes: 30,
        }];
        // Straddles the 09:30 and 10:00 slots.
        let taken = [confirmed(at(9, 45), at(10, 15))];

        let slots = expand_free_slots(&windows, &taken);
        let starts: Vec<_> = slots.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![at(9, 0), at(10, 30)]);
    }
}
