// libs/resource-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::{AvailabilityRule, ResourceKind};
use shared_store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResourceRequest {
    pub kind: ResourceKind,
    pub name: String,
    pub availability: Vec<AvailabilityRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub availability: Vec<AvailabilityRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Resource not found")]
    NotFound,

    #[error("Invalid availability rule: {0}")]
    InvalidRule(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => RegistryError::NotFound,
            other => RegistryError::Storage(other.to_string()),
        }
    }
}
