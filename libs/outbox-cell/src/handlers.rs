// libs/outbox-cell/src/handlers.rs
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{EventsQuery, OutboxError};
use crate::router::EventsState;

const DEFAULT_PAGE: usize = 100;
const MAX_PAGE: usize = 500;

impl From<OutboxError> for AppError {
    fn from(e: OutboxError) -> Self {
        match e {
            OutboxError::Storage(msg) => AppError::Storage(msg),
            OutboxError::Delivery(msg) => AppError::ExternalService(msg),
        }
    }
}

/// Cursor-paged read of the event log for polling subscribers.
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<EventsState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE).min(MAX_PAGE);

    let events = state
        .store
        .events_after(query.after, limit)
        .await
        .map_err(OutboxError::from)?;

    let next_cursor = events.last().map(|e| e.sequence).unwrap_or(query.after);

    Ok(Json(json!({
        "events": events,
        "next_cursor": next_cursor
    })))
}
