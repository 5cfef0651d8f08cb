use std::sync::Arc;

use axum::{routing::get, Router};

use outbox_cell::{event_routes, EventsState};
use resource_cell::{resource_routes, RegistryService, ResourceState};
use scheduling_cell::{booking_routes, BookingEngine, BookingState};
use shared_config::AppConfig;
use shared_identity::IdentityVerifier;
use shared_store::ScheduleStore;

pub fn create_router(
    store: Arc<dyn ScheduleStore>,
    identity: Arc<dyn IdentityVerifier>,
    config: &AppConfig,
) -> Router {
    let registry = Arc::new(RegistryService::new(store.clone()));
    let engine = Arc::new(BookingEngine::new(store.clone(), config));

    Router::new()
        .route("/", get(|| async { "Hospital scheduling API is running!" }))
        .nest(
            "/api/resources",
            resource_routes(ResourceState {
                registry,
                identity: identity.clone(),
            }),
        )
        .nest(
            "/api/bookings",
            booking_routes(BookingState { engine, identity }),
        )
        .nest("/api/events", event_routes(EventsState { store }))
}
