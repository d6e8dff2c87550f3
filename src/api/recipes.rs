use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{
    ApiError, ApiResponse, AppState, RecipeDetailDto, RecipeDto, RecipeImageDto,
    RecipePatchRequest, RecipeQuery, RecipeRequest, image_url,
};
use crate::models::RecipeFilter;
use crate::services::RecipeError;

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::RecipeNotFound(id) => Self::not_found("Recipe", id),
            RecipeError::AttributeNotFound(kind, id) => Self::not_found(kind.label(), id),
            RecipeError::Validation(msg) => Self::validation(msg),
            RecipeError::Database(msg) => Self::DatabaseError(msg),
            RecipeError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /api/recipe/recipes
///
/// `tags` and `ingredients` take comma-separated IDs. Within one parameter
/// any ID matches; both parameters together must each match.
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    query: Result<Query<RecipeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<RecipeDto>>>, ApiError> {
    let Query(query) = query?;
    let filter = RecipeFilter::parse(query.tags.as_deref(), query.ingredients.as_deref())?;

    let recipes = state.recipe_service().list_recipes(user.id, &filter).await?;

    Ok(Json(ApiResponse::success(
        recipes.into_iter().map(RecipeDto::from).collect(),
    )))
}

/// POST /api/recipe/recipes
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeDetailDto>>), ApiError> {
    let Json(payload) = payload?;

    let recipe = state
        .recipe_service()
        .create_recipe(user.id, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(recipe.into())),
    ))
}

/// GET /api/recipe/recipes/{id}
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RecipeDetailDto>>, ApiError> {
    let id = validate_id("recipe", id)?;
    let recipe = state.recipe_service().get_recipe(user.id, id).await?;

    Ok(Json(ApiResponse::success(recipe.into())))
}

/// PUT /api/recipe/recipes/{id}
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RecipeDetailDto>>, ApiError> {
    let id = validate_id("recipe", id)?;
    let Json(payload) = payload?;

    let recipe = state
        .recipe_service()
        .update_recipe(user.id, id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(recipe.into())))
}

/// PATCH /api/recipe/recipes/{id}
pub async fn patch_recipe(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<RecipePatchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RecipeDetailDto>>, ApiError> {
    let id = validate_id("recipe", id)?;
    let Json(payload) = payload?;

    let recipe = state
        .recipe_service()
        .update_recipe(user.id, id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(recipe.into())))
}

/// DELETE /api/recipe/recipes/{id}
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("recipe", id)?;
    state.recipe_service().delete_recipe(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipe/recipes/{id}/upload-image
///
/// Multipart body with a single `image` file field.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<RecipeImageDto>>, ApiError> {
    let id = validate_id("recipe", id)?;
    let mut multipart = multipart.map_err(|e| ApiError::validation(e.body_text()))?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            image = Some(bytes);
        }
    }

    let bytes = image.ok_or_else(|| ApiError::validation("No file was submitted"))?;
    if bytes.is_empty() {
        return Err(ApiError::validation("The submitted file is empty"));
    }

    let uploaded = state
        .recipe_service()
        .upload_image(user.id, id, &bytes)
        .await?;

    Ok(Json(ApiResponse::success(RecipeImageDto {
        id: uploaded.id,
        image: image_url(&uploaded.image),
    })))
}
