use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::missing_field;
use super::{
    ApiError, ApiResponse, AppState, CreateUserRequest, TokenDto, TokenRequest, UpdateUserRequest,
    UserDto,
};
use crate::models::ProfileUpdate;

/// POST /api/user/create
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let Json(payload) = payload?;

    let user = state
        .user_service()
        .create_user(&payload.email, &payload.password, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

/// POST /api/user/token
/// Exchange email and password for the account's token
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TokenDto>>, ApiError> {
    let Json(payload) = payload?;

    let token = state
        .user_service()
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(TokenDto { token })))
}

/// GET /api/user/me
pub async fn get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(user.into()))
}

/// PUT /api/user/me
/// Full replacement: `email`, `password` and `name` are all required
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Json(payload) = payload?;

    if payload.email.is_none() {
        return Err(missing_field("email"));
    }
    if payload.password.is_none() {
        return Err(missing_field("password"));
    }
    if payload.name.is_none() {
        return Err(missing_field("name"));
    }

    apply_profile_update(&state, user.id, payload).await
}

/// PATCH /api/user/me
pub async fn patch_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Json(payload) = payload?;
    apply_profile_update(&state, user.id, payload).await
}

async fn apply_profile_update(
    state: &AppState,
    user_id: i32,
    payload: UpdateUserRequest,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let update = ProfileUpdate {
        email: payload.email,
        name: payload.name,
        password: payload.password,
    };

    let user = state.user_service().update_profile(user_id, update).await?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(ApiResponse::success(user.into())))
}
