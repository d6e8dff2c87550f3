//! Handlers shared by the tag and ingredient endpoints.
//!
//! Each route is registered twice in the router, once per
//! [`AttributeKind`], through the thin wrappers at the bottom of this file.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{missing_field, validate_id};
use super::{ApiError, ApiResponse, AppState, AttributeDto, AttributeQuery};
use crate::models::{AttributeFilter, AttributeKind};

#[derive(Debug, serde::Deserialize)]
pub struct AttributeUpdateRequest {
    pub name: Option<String>,
}

type ListResponse = Result<Json<ApiResponse<Vec<AttributeDto>>>, ApiError>;
type ItemResponse = Result<Json<ApiResponse<AttributeDto>>, ApiError>;

async fn list(
    kind: AttributeKind,
    state: &AppState,
    user: &CurrentUser,
    query: Result<Query<AttributeQuery>, QueryRejection>,
) -> ListResponse {
    let Query(query) = query?;
    let filter = AttributeFilter::parse(query.assigned_only.as_deref())?;

    let items = state
        .recipe_service()
        .list_attributes(kind, user.0.id, filter)
        .await?;

    Ok(Json(ApiResponse::success(
        items.into_iter().map(AttributeDto::from).collect(),
    )))
}

/// PUT requires `name`; PATCH without it returns the row unchanged.
async fn update(
    kind: AttributeKind,
    state: &AppState,
    user: &CurrentUser,
    id: i32,
    payload: Result<Json<AttributeUpdateRequest>, JsonRejection>,
    partial: bool,
) -> ItemResponse {
    let id = validate_id(kind.as_str(), id)?;
    let Json(payload) = payload?;
    let service = state.recipe_service();

    let attribute = match (payload.name, partial) {
        (Some(name), _) => service.rename_attribute(kind, user.0.id, id, &name).await?,
        (None, true) => service.get_attribute(kind, user.0.id, id).await?,
        (None, false) => return Err(missing_field("name")),
    };

    Ok(Json(ApiResponse::success(attribute.into())))
}

async fn delete(
    kind: AttributeKind,
    state: &AppState,
    user: &CurrentUser,
    id: i32,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(kind.as_str(), id)?;
    state
        .recipe_service()
        .delete_attribute(kind, user.0.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Tags
// ============================================================================

/// GET /api/recipe/tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<AttributeQuery>, QueryRejection>,
) -> ListResponse {
    list(AttributeKind::Tag, &state, &user, query).await
}

/// PUT /api/recipe/tags/{id}
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<AttributeUpdateRequest>, JsonRejection>,
) -> ItemResponse {
    update(AttributeKind::Tag, &state, &user, id, payload, false).await
}

/// PATCH /api/recipe/tags/{id}
pub async fn patch_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<AttributeUpdateRequest>, JsonRejection>,
) -> ItemResponse {
    update(AttributeKind::Tag, &state, &user, id, payload, true).await
}

/// DELETE /api/recipe/tags/{id}
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    delete(AttributeKind::Tag, &state, &user, id).await
}

// ============================================================================
// Ingredients
// ============================================================================

/// GET /api/recipe/ingredients
pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<AttributeQuery>, QueryRejection>,
) -> ListResponse {
    list(AttributeKind::Ingredient, &state, &user, query).await
}

/// PUT /api/recipe/ingredients/{id}
pub async fn update_ingredient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<AttributeUpdateRequest>, JsonRejection>,
) -> ItemResponse {
    update(AttributeKind::Ingredient, &state, &user, id, payload, false).await
}

/// PATCH /api/recipe/ingredients/{id}
pub async fn patch_ingredient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<AttributeUpdateRequest>, JsonRejection>,
) -> ItemResponse {
    update(AttributeKind::Ingredient, &state, &user, id, payload, true).await
}

/// DELETE /api/recipe/ingredients/{id}
pub async fn delete_ingredient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    delete(AttributeKind::Ingredient, &state, &user, id).await
}
