// libs/resource-cell/tests/registry_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use resource_cell::{windows_in_range, RegistryError, RegistryService};
use shared_models::{AvailabilityRule, ResourceKind, ResourceStatus};
use shared_store::MemoryStore;

fn weekday_rule(day: i16, start: (u32, u32), end: (u32, u32)) -> AvailabilityRule {
    AvailabilityRule {
        day_of_week: day,
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        slot_minutes: 30,
    }
}

fn service() -> RegistryService {
    RegistryService::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn register_and_fetch_resource() {
    let registry = service();

    let resource = registry
        .register_resource(
            ResourceKind::Doctor,
            "Dr. Osei".to_string(),
            vec![weekday_rule(1, (9, 0), (17, 0))],
        )
        .await
        .unwrap();

    assert_eq!(resource.status, ResourceStatus::Active);

    let fetched = registry.get_resource(resource.id).await.unwrap();
    assert_eq!(fetched.id, resource.id);
    assert_eq!(fetched.availability.len(), 1);
}

#[tokio::test]
async fn register_rejects_invalid_rules() {
    let registry = service();

    let err = registry
        .register_resource(
            ResourceKind::Room,
            "Theatre 2".to_string(),
            vec![weekday_rule(1, (9, 15), (17, 0))],
        )
        .await
        .unwrap_err();

    assert_matches!(err, RegistryError::InvalidRule(_));
}

#[tokio::test]
async fn update_availability_replaces_rules() {
    let registry = service();

    let resource = registry
        .register_resource(
            ResourceKind::Equipment,
            "MRI scanner".to_string(),
            vec![weekday_rule(1, (9, 0), (17, 0))],
        )
        .await
        .unwrap();

    let updated = registry
        .update_availability(
            resource.id,
            vec![
                weekday_rule(2, (8, 0), (12, 0)),
                weekday_rule(4, (13, 0), (17, 30)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(updated.availability.len(), 2);
    assert_eq!(updated.availability[0].day_of_week, 2);
}

#[tokio::test]
async fn suspend_and_reinstate_round_trip() {
    let registry = service();

    let resource = registry
        .register_resource(ResourceKind::Room, "Ward B".to_string(), vec![])
        .await
        .unwrap();

    let suspended = registry.suspend(resource.id).await.unwrap();
    assert_eq!(suspended.status, ResourceStatus::Suspended);

    let reinstated = registry.reinstate(resource.id).await.unwrap();
    assert_eq!(reinstated.status, ResourceStatus::Active);
}

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let registry = service();

    let err = registry.get_resource(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, RegistryError::NotFound);
}

#[tokio::test]
async fn availability_materializes_only_matching_weekdays() {
    let registry = service();

    // Mondays 09:00-17:00, Wednesdays 08:00-12:00.
    let resource = registry
        .register_resource(
            ResourceKind::Doctor,
            "Dr. Lindqvist".to_string(),
            vec![
                weekday_rule(1, (9, 0), (17, 0)),
                weekday_rule(3, (8, 0), (12, 0)),
            ],
        )
        .await
        .unwrap();

    // 2025-03-03 is a Monday.
    let from = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();

    let windows = registry
        .get_availability(resource.id, from, to)
        .await
        .unwrap();

    assert_eq!(windows.len(), 2);
    assert_eq!(
        windows[0].start_time,
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    );
    assert_eq!(
        windows[1].start_time,
        Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap()
    );
    assert_eq!(
        windows[1].end_time,
        Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn availability_windows_clamp_to_query_range() {
    let registry = service();

    let resource = registry
        .register_resource(
            ResourceKind::Doctor,
            "Dr. Moreau".to_string(),
            vec![weekday_rule(1, (9, 0), (17, 0))],
        )
        .await
        .unwrap();

    // Query cuts into the middle of the Monday window.
    let from = Utc.with_ymd_and_hms(2025, 3, 3, 11, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap();

    let windows = registry
        .get_availability(resource.id, from, to)
        .await
        .unwrap();

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].start_time, from);
    assert_eq!(windows[0].end_time, to);
}

#[test]
fn empty_range_yields_no_windows() {
    let resource = shared_models::Resource {
        id: Uuid::new_v4(),
        kind: ResourceKind::Room,
        name: "Ward A".to_string(),
        status: ResourceStatus::Active,
        availability: vec![weekday_rule(1, (9, 0), (17, 0))],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let at = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    assert!(windows_in_range(&resource, at, at).is_empty());
}
