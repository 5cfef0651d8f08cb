// libs/resource-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_identity::{IdentityError, RequesterContext};
use shared_models::error::AppError;

use crate::models::{
    AvailabilityQuery, RegisterResourceRequest, RegistryError, UpdateAvailabilityRequest,
};
use crate::router::ResourceState;

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RegistryError::InvalidRule(msg) => AppError::BadRequest(msg),
            RegistryError::Storage(msg) => AppError::Storage(msg),
        }
    }
}

async fn require_staff(
    state: &ResourceState,
    token: &str,
) -> Result<RequesterContext, AppError> {
    let ctx = state.identity.verify(token).await.map_err(|e| match e {
        IdentityError::InvalidToken => AppError::Auth("Invalid or expired token".to_string()),
        IdentityError::Unreachable(msg) => AppError::ExternalService(msg),
    })?;
    if !ctx.is_staff() {
        return Err(AppError::Forbidden(
            "Staff role required for this operation".to_string(),
        ));
    }
    Ok(ctx)
}

#[axum::debug_handler]
pub async fn register_resource(
    State(state): State<ResourceState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RegisterResourceRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, auth.token()).await?;

    let resource = state
        .registry
        .register_resource(request.kind, request.name, request.availability)
        .await?;

    Ok(Json(json!({
        "success": true,
        "resource": resource
    })))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<ResourceState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(resource_id): Path<Uuid>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, auth.token()).await?;

    let resource = state
        .registry
        .update_availability(resource_id, request.availability)
        .await?;

    Ok(Json(json!({
        "success": true,
        "resource": resource
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<ResourceState>,
    Path(resource_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    if query.from >= query.to {
        return Err(AppError::BadRequest(
            "'from' must be before 'to'".to_string(),
        ));
    }

    let windows = state
        .registry
        .get_availability(resource_id, query.from, query.to)
        .await?;

    Ok(Json(json!({
        "resource_id": resource_id,
        "windows": windows
    })))
}

#[axum::debug_handler]
pub async fn suspend_resource(
    State(state): State<ResourceState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, auth.token()).await?;

    let resource = state.registry.suspend(resource_id).await?;

    Ok(Json(json!({
        "success": true,
        "resource": resource
    })))
}

#[axum::debug_handler]
pub async fn reinstate_resource(
    State(state): State<ResourceState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&state, auth.token()).await?;

    let resource = state.registry.reinstate(resource_id).await?;

    Ok(Json(json!({
        "success": true,
        "resource": resource
    })))
}

#[axum::debug_handler]
pub async fn get_resource(
    State(state): State<ResourceState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let resource = state.registry.get_resource(resource_id).await?;
    Ok(Json(json!({ "resource": resource })))
}

#[axum::debug_handler]
pub async fn list_resources(
    State(state): State<ResourceState>,
) -> Result<Json<Value>, AppError> {
    let resources = state.registry.list_resources().await?;
    Ok(Json(json!({ "resources": resources })))
}
