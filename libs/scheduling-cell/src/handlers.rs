// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_identity::{IdentityError, RequesterContext};
use shared_models::{error::AppError, TimeInterval};

use crate::models::{BookingError, BookingRequest, ConflictQuery, SlotQuery};
use crate::router::BookingState;

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::ResourceNotFound | BookingError::BookingNotFound => {
                AppError::NotFound(e.to_string())
            }
            BookingError::InvalidInterval(_) | BookingError::ResourceSuspended => {
                AppError::BadRequest(e.to_string())
            }
            BookingError::Conflict
            | BookingError::AlreadyTerminal
            | BookingError::NotConfirmed
            | BookingError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            BookingError::TransientStorage(msg) | BookingError::Storage(msg) => {
                AppError::Storage(msg)
            }
        }
    }
}

async fn verify(state: &BookingState, token: &str) -> Result<RequesterContext, AppError> {
    state.identity.verify(token).await.map_err(|e| match e {
        IdentityError::InvalidToken => AppError::Auth("Invalid or expired token".to_string()),
        IdentityError::Unreachable(msg) => AppError::ExternalService(msg),
    })
}

#[axum::debug_handler]
pub async fn request_booking(
    State(state): State<BookingState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let ctx = verify(&state, auth.token()).await?;

    let booking = state
        .engine
        .request_booking(
            request.resource_id,
            &ctx.account_id,
            TimeInterval::new(request.start_time, request.end_time),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "booking": booking
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<BookingState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let ctx = verify(&state, auth.token()).await?;

    let booking = state.engine.get_booking(booking_id).await?;
    if booking.requester != ctx.account_id && !ctx.is_staff() {
        return Err(AppError::Forbidden(
            "Not authorized to view this booking".to_string(),
        ));
    }

    Ok(Json(json!({ "booking": booking })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<BookingState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let ctx = verify(&state, auth.token()).await?;

    // Requesters cancel their own bookings; staff may cancel any.
    let existing = state.engine.get_booking(booking_id).await?;
    if existing.requester != ctx.account_id && !ctx.is_staff() {
        return Err(AppError::Forbidden(
            "Not authorized to cancel this booking".to_string(),
        ));
    }

    let booking = state
        .engine
        .cancel_booking(booking_id, &ctx.account_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn complete_booking(
    State(state): State<BookingState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let ctx = verify(&state, auth.token()).await?;
    if !ctx.is_staff() {
        return Err(AppError::Forbidden(
            "Staff role required to complete bookings".to_string(),
        ));
    }

    let booking = state.engine.complete_booking(booking_id).await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<BookingState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state
        .engine
        .available_slots(query.resource_id, query.from, query.to)
        .await?;

    Ok(Json(json!({
        "resource_id": query.resource_id,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn check_conflicts(
    State(state): State<BookingState>,
    Query(query): Query<ConflictQuery>,
) -> Result<Json<Value>, AppError> {
    let report = state
        .engine
        .check_conflict(
            query.resource_id,
            TimeInterval::new(query.start_time, query.end_time),
        )
        .await?;

    Ok(Json(json!({
        "resource_id": query.resource_id,
        "conflict": report.conflict,
        "conflicting_booking_ids": report.conflicting_booking_ids
    })))
}
