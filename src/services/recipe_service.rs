//! Domain service for recipes and the tag/ingredient registries.
//!
//! Every operation is scoped to the acting user. Rows owned by someone
//! else behave exactly like rows that do not exist.

use crate::db::UniqueViolation;
use crate::models::{
    Attribute, AttributeFilter, AttributeKind, FilterError, PriceError, Recipe, RecipeChanges,
    RecipeDraft, RecipeFilter,
};
use thiserror::Error;

/// Errors specific to recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Recipe {0} not found")]
    RecipeNotFound(i32),

    #[error("{} {} not found", .0.label(), .1)]
    AttributeNotFound(AttributeKind, i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(violation) = err.downcast_ref::<UniqueViolation>() {
            return Self::Validation(violation.to_string());
        }
        Self::Internal(err.to_string())
    }
}

impl From<FilterError> for RecipeError {
    fn from(err: FilterError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PriceError> for RecipeError {
    fn from(err: PriceError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Outcome of an image upload.
#[derive(Debug, Clone)]
pub struct RecipeImage {
    pub id: i32,
    /// Path relative to the images directory.
    pub image: String,
}

/// Domain service trait for recipes, tags and ingredients.
#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    /// The caller's recipes, newest first, narrowed by `filter`.
    async fn list_recipes(
        &self,
        user_id: i32,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeError>;

    async fn get_recipe(&self, user_id: i32, id: i32) -> Result<Recipe, RecipeError>;

    /// Creates a recipe, get-or-creating its tags and ingredients under the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Validation`] for a blank or overlong title, a
    /// negative time estimate, or a blank tag/ingredient name.
    async fn create_recipe(&self, user_id: i32, draft: RecipeDraft)
    -> Result<Recipe, RecipeError>;

    /// Applies a partial update. A `Some` tag or ingredient list replaces
    /// the existing links wholesale.
    async fn update_recipe(
        &self,
        user_id: i32,
        id: i32,
        changes: RecipeChanges,
    ) -> Result<Recipe, RecipeError>;

    /// Deletes the recipe. Its tags and ingredients are kept.
    async fn delete_recipe(&self, user_id: i32, id: i32) -> Result<(), RecipeError>;

    /// Stores `bytes` as the recipe's image, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Validation`] when `bytes` is not a recognised
    /// image format.
    async fn upload_image(
        &self,
        user_id: i32,
        id: i32,
        bytes: &[u8],
    ) -> Result<RecipeImage, RecipeError>;

    async fn list_attributes(
        &self,
        kind: AttributeKind,
        user_id: i32,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, RecipeError>;

    async fn get_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
    ) -> Result<Attribute, RecipeError>;

    async fn rename_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<Attribute, RecipeError>;

    async fn delete_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
    ) -> Result<(), RecipeError>;
}
