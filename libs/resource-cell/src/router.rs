// libs/resource-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_identity::IdentityVerifier;

use crate::handlers;
use crate::services::registry::RegistryService;

#[derive(Clone)]
pub struct ResourceState {
    pub registry: Arc<RegistryService>,
    pub identity: Arc<dyn IdentityVerifier>,
}

pub fn resource_routes(state: ResourceState) -> Router {
    Router::new()
        .route("/", post(handlers::register_resource))
        .route("/", get(handlers::list_resources))
        .route("/{resource_id}", get(handlers::get_resource))
        .route("/{resource_id}/availability", put(handlers::update_availability))
        .route("/{resource_id}/availability", get(handlers::get_availability))
        .route("/{resource_id}/suspend", post(handlers::suspend_resource))
        .route("/{resource_id}/reinstate", post(handlers::reinstate_resource))
        .with_state(state)
}
