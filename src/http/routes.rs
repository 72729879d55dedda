//! User HTTP Routes
//!
//! CRUD endpoints under `/users` plus the health check.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument, Span};
use uuid::Uuid;

use super::response::{ApiError, ApiResponse, ApiResult};
use crate::clients::UserClient;
use crate::domain::User;
use crate::validation::UserInput;

// ==================
// Shared State
// ==================

/// State shared across handlers
#[derive(Clone)]
pub struct UsersState {
    pub users: UserClient,
}

/// Create user routes
pub fn user_routes(state: UsersState) -> Router {
    Router::new()
        .route(
            "/users",
            get(list_users).post(create_user).fallback(endpoint_not_found),
        )
        .route(
            "/users/:id",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user)
                .fallback(endpoint_not_found),
        )
        .with_state(state)
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler).fallback(endpoint_not_found))
}

// ==================
// Boundary checks
// ==================

/// Return true for a hyphenated 8-4-4-4-12 hexadecimal UUID, in either case.
pub fn is_valid_user_id(id: &str) -> bool {
    id.len() == 36 && Uuid::try_parse(id).is_ok()
}

// Records the id on the handler span. A segment that fails to decode counts as malformed.
fn checked_id(path: Result<Path<String>, PathRejection>) -> ApiResult<String> {
    let Path(id) = path.map_err(|rejection| {
        debug!(%rejection, "Rejected undecodable user id");
        ApiError::InvalidUserId
    })?;
    Span::current().record("user_id", id.as_str());

    if is_valid_user_id(&id) {
        Ok(id)
    } else {
        debug!(user_id = %id, "Rejected malformed user id");
        Err(ApiError::InvalidUserId)
    }
}

// An empty body is treated as an empty object.
fn parse_body(body: Result<Bytes, BytesRejection>) -> ApiResult<UserInput> {
    let body = body.map_err(|rejection| {
        debug!(%rejection, "Failed to read request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidBody
        }
    })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UserInput::default());
    }
    let value: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidBody)?;
    Ok(UserInput::from_json(value))
}

// ==================
// Handlers
// ==================

#[instrument(skip_all)]
async fn create_user(
    State(state): State<UsersState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ApiResponse<User>> {
    let params = parse_body(body)?.into_create()?;
    let user = state.users.create_user(params).await?;

    Ok(ApiResponse::ok(StatusCode::CREATED, "User created successfully").with_data(user))
}

#[instrument(skip(state))]
async fn list_users(State(state): State<UsersState>) -> ApiResult<ApiResponse<Vec<User>>> {
    let users = state.users.list_users().await?;

    Ok(ApiResponse::ok(StatusCode::OK, "Users retrieved successfully")
        .with_count(users.len())
        .with_data(users))
}

#[instrument(skip_all, fields(user_id = tracing::field::Empty))]
async fn get_user(
    State(state): State<UsersState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<User>> {
    let id = checked_id(id)?;
    let user = state.users.get_user(id).await?;

    Ok(ApiResponse::ok(StatusCode::OK, "User retrieved successfully").with_data(user))
}

#[instrument(skip_all, fields(user_id = tracing::field::Empty))]
async fn replace_user(
    State(state): State<UsersState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ApiResponse<User>> {
    let id = checked_id(id)?;
    let patch = parse_body(body)?.into_patch()?;
    let user = state.users.replace_user(id, patch).await?;

    Ok(ApiResponse::ok(StatusCode::OK, "User updated successfully").with_data(user))
}

#[instrument(skip_all, fields(user_id = tracing::field::Empty))]
async fn patch_user(
    State(state): State<UsersState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ApiResponse<User>> {
    let id = checked_id(id)?;
    let patch = parse_body(body)?.into_patch()?;
    let user = state.users.patch_user(id, patch).await?;

    Ok(ApiResponse::ok(StatusCode::OK, "User updated successfully").with_data(user))
}

#[instrument(skip_all, fields(user_id = tracing::field::Empty))]
async fn delete_user(
    State(state): State<UsersState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<()>> {
    let id = checked_id(id)?;
    state.users.delete_user(id).await?;

    Ok(ApiResponse::ok(StatusCode::OK, "User deleted successfully"))
}

async fn health_handler() -> ApiResponse<()> {
    ApiResponse::ok(StatusCode::OK, "API is running").with_timestamp(Utc::now())
}

/// Catch-all for unmatched paths and methods.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}
