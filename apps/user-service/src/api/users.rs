// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints under `/api/v1/auth`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{Auth, IdentityClaims},
    error::ApiError,
    models::{ApiResponse, LoginRequest, RegisterRequest, UpdateRequest, UserResponse, Validate},
    services::{UserServiceError, UserServiceResult},
    state::AppState,
};

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound => ApiError::not_found(err.to_string()),
            UserServiceError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            UserServiceError::UsernameExists | UserServiceError::EmailExists => {
                ApiError::conflict(err.to_string())
            }
            UserServiceError::PasswordDoesNotMatch => ApiError::bad_request(err.to_string()),
            UserServiceError::Forbidden => ApiError::forbidden(err.to_string()),
            UserServiceError::Storage(_)
            | UserServiceError::PasswordHash(_)
            | UserServiceError::TokenIssue(_) => ApiError::internal(err),
        }
    }
}

/// Unwrap a JSON body and run its validation rules.
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    request.validate().map_err(ApiError::validation)?;
    Ok(request)
}

fn user_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(uuid)| uuid)
        .map_err(|_| ApiError::bad_request("invalid user id"))
}

/// Run password hashing and database work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> UserServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

/// Register a new customer account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = ApiResponse<IdentityClaims>),
        (status = 409, description = "Username or email already taken"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let request = validated(payload)?;
    let users = state.users.clone();
    let user = blocking(move || users.register(request)).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Log in and receive a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, `token` set", body = ApiResponse<IdentityClaims>),
        (status = 401, description = "Username or password is incorrect"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let request = validated(payload)?;
    let users = state.users.clone();
    let response = blocking(move || users.login(request)).await?;
    Ok(Json(ApiResponse::ok(response.user).with_token(response.token)))
}

/// Get the identity the caller authenticated with.
#[utoipa::path(
    get,
    path = "/api/v1/auth/user",
    tag = "Users",
    security(("bearer" = [], "api_key" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<IdentityClaims>),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn get_user_login(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(state.users.current_user(&user)))
}

/// Get any account by id.
#[utoipa::path(
    get,
    path = "/api/v1/auth/{uuid}",
    tag = "Users",
    params(("uuid" = Uuid, Path, description = "User id")),
    security(("bearer" = [], "api_key" = [])),
    responses(
        (status = 200, description = "User", body = ApiResponse<IdentityClaims>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user_by_uuid(
    Auth(_caller): Auth,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let uuid = user_id(path)?;
    let users = state.users.clone();
    let user = blocking(move || users.get_by_uuid(uuid)).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Update an account. Customers may only update themselves.
#[utoipa::path(
    put,
    path = "/api/v1/auth/{uuid}",
    tag = "Users",
    params(("uuid" = Uuid, Path, description = "User id")),
    request_body = UpdateRequest,
    security(("bearer" = [], "api_key" = [])),
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<IdentityClaims>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not allowed to update this user"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already taken"),
    )
)]
pub async fn update_user(
    Auth(caller): Auth,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let uuid = user_id(path)?;
    let request = validated(payload)?;
    let users = state.users.clone();
    let user = blocking(move || users.update(&caller, uuid, request)).await?;
    Ok(Json(ApiResponse::ok(user)))
}
