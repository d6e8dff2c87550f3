//! `SeaORM` implementation of the `RecipeService` trait.

use crate::db::Store;
use crate::models::{
    Attribute, AttributeFilter, AttributeKind, Recipe, RecipeChanges, RecipeDraft, RecipeFilter,
};
use crate::services::image::{ImageFormat, ImageService};
use crate::services::recipe_service::{RecipeError, RecipeImage, RecipeService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

const MAX_TITLE_LEN: usize = 255;
const MAX_LINK_LEN: usize = 255;
const MAX_NAME_LEN: usize = 255;

pub struct SeaOrmRecipeService {
    store: Store,
    images: Arc<ImageService>,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(store: Store, images: Arc<ImageService>) -> Self {
        Self { store, images }
    }
}

fn validate_title(title: &str) -> Result<String, RecipeError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RecipeError::Validation("Title cannot be blank".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(RecipeError::Validation(format!(
            "Title must be {MAX_TITLE_LEN} characters or less"
        )));
    }
    Ok(title.to_string())
}

fn validate_time_minutes(minutes: i32) -> Result<i32, RecipeError> {
    if minutes < 0 {
        return Err(RecipeError::Validation(
            "time_minutes cannot be negative".to_string(),
        ));
    }
    Ok(minutes)
}

fn validate_link(link: &str) -> Result<String, RecipeError> {
    let link = link.trim();
    if link.chars().count() > MAX_LINK_LEN {
        return Err(RecipeError::Validation(format!(
            "Link must be {MAX_LINK_LEN} characters or less"
        )));
    }
    Ok(link.to_string())
}

fn validate_name(kind: AttributeKind, name: &str) -> Result<String, RecipeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecipeError::Validation(format!(
            "{} name cannot be blank",
            kind.label()
        )));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RecipeError::Validation(format!(
            "{} name must be {MAX_NAME_LEN} characters or less",
            kind.label()
        )));
    }
    Ok(name.to_string())
}

fn validate_names(kind: AttributeKind, names: Vec<String>) -> Result<Vec<String>, RecipeError> {
    names
        .into_iter()
        .map(|name| validate_name(kind, &name))
        .collect()
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn list_recipes(
        &self,
        user_id: i32,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.store.list_recipes(user_id, filter).await?)
    }

    async fn get_recipe(&self, user_id: i32, id: i32) -> Result<Recipe, RecipeError> {
        self.store
            .get_recipe(user_id, id)
            .await?
            .ok_or(RecipeError::RecipeNotFound(id))
    }

    async fn create_recipe(
        &self,
        user_id: i32,
        draft: RecipeDraft,
    ) -> Result<Recipe, RecipeError> {
        let draft = RecipeDraft {
            title: validate_title(&draft.title)?,
            time_minutes: validate_time_minutes(draft.time_minutes)?,
            price: draft.price,
            link: validate_link(&draft.link)?,
            description: draft.description,
            tags: validate_names(AttributeKind::Tag, draft.tags)?,
            ingredients: validate_names(AttributeKind::Ingredient, draft.ingredients)?,
        };

        let recipe = self.store.create_recipe(user_id, draft).await?;
        info!(recipe_id = recipe.id, user_id, "Created recipe '{}'", recipe);
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        user_id: i32,
        id: i32,
        changes: RecipeChanges,
    ) -> Result<Recipe, RecipeError> {
        let changes = RecipeChanges {
            title: changes.title.as_deref().map(validate_title).transpose()?,
            time_minutes: changes.time_minutes.map(validate_time_minutes).transpose()?,
            price: changes.price,
            link: changes.link.as_deref().map(validate_link).transpose()?,
            description: changes.description,
            tags: changes
                .tags
                .map(|names| validate_names(AttributeKind::Tag, names))
                .transpose()?,
            ingredients: changes
                .ingredients
                .map(|names| validate_names(AttributeKind::Ingredient, names))
                .transpose()?,
        };

        self.store
            .update_recipe(user_id, id, changes)
            .await?
            .ok_or(RecipeError::RecipeNotFound(id))
    }

    async fn delete_recipe(&self, user_id: i32, id: i32) -> Result<(), RecipeError> {
        if !self.store.delete_recipe(user_id, id).await? {
            return Err(RecipeError::RecipeNotFound(id));
        }
        debug!(recipe_id = id, user_id, "Deleted recipe");
        Ok(())
    }

    async fn upload_image(
        &self,
        user_id: i32,
        id: i32,
        bytes: &[u8],
    ) -> Result<RecipeImage, RecipeError> {
        self.get_recipe(user_id, id).await?;

        let format = ImageFormat::detect(bytes).ok_or_else(|| {
            RecipeError::Validation(
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
                    .to_string(),
            )
        })?;

        let reference = self.images.save_recipe_image(format, bytes).await?;

        match self.store.set_recipe_image(user_id, id, &reference).await {
            Ok(Some((recipe, previous))) => {
                if let Some(previous) = previous.filter(|p| *p != reference) {
                    self.images.remove(&previous).await;
                }
                Ok(RecipeImage {
                    id: recipe.id,
                    image: reference,
                })
            }
            Ok(None) => {
                self.images.remove(&reference).await;
                Err(RecipeError::RecipeNotFound(id))
            }
            Err(e) => {
                self.images.remove(&reference).await;
                Err(e.into())
            }
        }
    }

    async fn list_attributes(
        &self,
        kind: AttributeKind,
        user_id: i32,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, RecipeError> {
        Ok(self
            .store
            .list_attributes(kind, user_id, filter.assigned_only)
            .await?)
    }

    async fn get_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
    ) -> Result<Attribute, RecipeError> {
        self.store
            .get_attribute(kind, user_id, id)
            .await?
            .ok_or(RecipeError::AttributeNotFound(kind, id))
    }

    async fn rename_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<Attribute, RecipeError> {
        let name = validate_name(kind, name)?;
        self.store
            .rename_attribute(kind, user_id, id, &name)
            .await?
            .ok_or(RecipeError::AttributeNotFound(kind, id))
    }

    async fn delete_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
    ) -> Result<(), RecipeError> {
        if !self.store.delete_attribute(kind, user_id, id).await? {
            return Err(RecipeError::AttributeNotFound(kind, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Steak  ").unwrap(), "Steak");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(256)).is_err());
        assert!(validate_title(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn test_validate_time_minutes() {
        assert_eq!(validate_time_minutes(0).unwrap(), 0);
        assert!(validate_time_minutes(-1).is_err());
    }

    #[test]
    fn test_validate_names_trims_and_rejects_blank() {
        let names = validate_names(
            AttributeKind::Tag,
            vec![" Vegan ".to_string(), "Dessert".to_string()],
        )
        .unwrap();
        assert_eq!(names, vec!["Vegan", "Dessert"]);

        let err = validate_names(AttributeKind::Ingredient, vec![String::new()]).unwrap_err();
        assert!(err.to_string().contains("Ingredient name cannot be blank"));
    }
}
