// libs/outbox-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_store::ScheduleStore;

use crate::handlers;

#[derive(Clone)]
pub struct EventsState {
    pub store: Arc<dyn ScheduleStore>,
}

pub fn event_routes(state: EventsState) -> Router {
    Router::new()
        .route("/", get(handlers::list_events))
        .with_state(state)
}
