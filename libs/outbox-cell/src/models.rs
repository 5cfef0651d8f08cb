// libs/outbox-cell/src/models.rs
use serde::Deserialize;

use shared_store::StoreError;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EventsQuery {
    /// Return events with sequence strictly greater than this cursor.
    #[serde(default)]
    pub after: u64,
    pub limit: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Event delivery failed: {0}")]
    Delivery(String),
}

impl From<StoreError> for OutboxError {
    fn from(e: StoreError) -> Self {
        OutboxError::Storage(e.to_string())
    }
}
