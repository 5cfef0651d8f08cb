// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_identity::IdentityVerifier;

use crate::handlers;
use crate::services::booking::BookingEngine;

#[derive(Clone)]
pub struct BookingState {
    pub engine: Arc<BookingEngine>,
    pub identity: Arc<dyn IdentityVerifier>,
}

pub fn booking_routes(state: BookingState) -> Router {
    Router::new()
        .route("/", post(handlers::request_booking))
        .route("/slots", get(handlers::available_slots))
        .route("/conflicts/check", get(handlers::check_conflicts))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/{booking_id}/complete", post(handlers::complete_booking))
        .with_state(state)
}
