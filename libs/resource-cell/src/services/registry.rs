// libs/resource-cell/src/services/registry.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::{
    AvailabilityRule, AvailabilityWindow, Resource, ResourceKind, ResourceStatus,
};
use shared_store::ScheduleStore;

use crate::models::RegistryError;

/// Longest single availability window the admin surface accepts.
const MAX_RULE_HOURS: i64 = 12;

pub struct RegistryService {
    store: Arc<dyn ScheduleStore>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn register_resource(
        &self,
        kind: ResourceKind,
        name: String,
        availability: Vec<AvailabilityRule>,
    ) -> Result<Resource, RegistryError> {
        validate_rules(&availability)?;

        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4(),
            kind,
            name,
            status: ResourceStatus::Active,
            availability,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_resource(resource.clone()).await?;
        info!("Registered {} resource {}", resource.kind, resource.id);
        Ok(resource)
    }

    /// Replace a resource's rule set. Existing bookings are deliberately
    /// left untouched: confirmed intervals stay valid as of their commit
    /// time regardless of later availability edits.
    pub async fn update_availability(
        &self,
        id: Uuid,
        availability: Vec<AvailabilityRule>,
    ) -> Result<Resource, RegistryError> {
        validate_rules(&availability)?;

        let mut resource = self.store.resource(id).await?;
        resource.availability = availability;
        resource.updated_at = Utc::now();
        self.store.update_resource(resource.clone()).await?;

        info!("Updated availability for resource {}", id);
        Ok(resource)
    }

    /// Concrete availability windows for the resource within `[from, to)`,
    /// ordered by start time.
    pub async fn get_availability(
        &self,
        id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityWindow>, RegistryError> {
        let resource = self.store.resource(id).await?;
        debug!(
            "Materializing availability for resource {} in [{}, {})",
            id, from, to
        );
        Ok(windows_in_range(&resource, from, to))
    }

    pub async fn suspend(&self, id: Uuid) -> Result<Resource, RegistryError> {
        self.set_status(id, ResourceStatus::Suspended).await
    }

    pub async fn reinstate(&self, id: Uuid) -> Result<Resource, RegistryError> {
        self.set_status(id, ResourceStatus::Active).await
    }

    pub async fn get_resource(&self, id: Uuid) -> Result<Resource, RegistryError> {
        Ok(self.store.resource(id).await?)
    }

    pub async fn list_resources(&self) -> Result<Vec<Resource>, RegistryError> {
        Ok(self.store.list_resources().await?)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ResourceStatus,
    ) -> Result<Resource, RegistryError> {
        let mut resource = self.store.resource(id).await?;
        resource.status = status;
        resource.updated_at = Utc::now();
        self.store.update_resource(resource.clone()).await?;
        info!("Resource {} status set to {:?}", id, status);
        Ok(resource)
    }
}

/// Materialize a resource's recurring rules into concrete UTC windows
/// within `[from, to)`. Pure interval math on absolute instants; windows
/// that only partially intersect the range are clamped to it.
pub fn windows_in_range(
    resource: &Resource,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<AvailabilityWindow> {
    let mut windows = Vec::new();
    if from >= to {
        return windows;
    }

    let mut date = from.date_naive();
    let last = to.date_naive();

    while date <= last {
        let weekday = day_index(date.weekday());
        for rule in &resource.availability {
            if rule.day_of_week != weekday {
                continue;
            }
            let start = date.and_time(rule.start_time).and_utc();
            let end = date.and_time(rule.end_time).and_utc();
            if end <= from || start >= to {
                continue;
            }
            windows.push(AvailabilityWindow {
                start_time: start.max(from),
                end_time: end.min(to),
                slot_minutes: rule.slot_minutes,
            });
        }
        date += Duration::days(1);
    }

    windows.sort_by_key(|w| w.start_time);
    windows
}

pub(crate) fn day_index(weekday: Weekday) -> i16 {
    match weekday {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

fn validate_rules(rules: &[AvailabilityRule]) -> Result<(), RegistryError> {
    for rule in rules {
        if rule.day_of_week < 0 || rule.day_of_week > 6 {
            return Err(RegistryError::InvalidRule(format!(
                "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {}",
                rule.day_of_week
            )));
        }
        if rule.start_time >= rule.end_time {
            return Err(RegistryError::InvalidRule(
                "start_time must be before end_time".to_string(),
            ));
        }
        let span = rule.end_time - rule.start_time;
        if span > Duration::hours(MAX_RULE_HOURS) {
            return Err(RegistryError::InvalidRule(format!(
                "window cannot exceed {} hours",
                MAX_RULE_HOURS
            )));
        }
        for boundary in [rule.start_time, rule.end_time] {
            if boundary.minute() % 30 != 0 || boundary.second() != 0 {
                return Err(RegistryError::InvalidRule(
                    "window boundaries must fall on 30-minute marks".to_string(),
                ));
            }
        }
        if rule.slot_minutes <= 0 {
            return Err(RegistryError::InvalidRule(
                "slot_minutes must be positive".to_string(),
            ));
        }
    }
    Ok(())
}
