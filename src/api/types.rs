use serde::{Deserialize, Serialize};

use crate::models::{Attribute, Price, Recipe, RecipeChanges, RecipeDraft, User};

/// URL prefix uploaded images are served under.
pub const IMAGES_URL_PREFIX: &str = "/images";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[must_use]
pub fn image_url(reference: &str) -> String {
    format!("{IMAGES_URL_PREFIX}/{reference}")
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub email: String,
    pub name: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenDto {
    pub token: String,
}

/// Body of PUT and PATCH on the caller's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Tags & ingredients
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AttributeDto {
    pub id: i32,
    pub name: String,
}

impl From<Attribute> for AttributeDto {
    fn from(attribute: Attribute) -> Self {
        Self {
            id: attribute.id,
            name: attribute.name,
        }
    }
}

/// A nested tag or ingredient in a write payload. Any `id` is ignored.
#[derive(Debug, Deserialize)]
pub struct AttributeInput {
    pub name: String,
}

fn names(inputs: Vec<AttributeInput>) -> Vec<String> {
    inputs.into_iter().map(|i| i.name).collect()
}

#[derive(Debug, Deserialize)]
pub struct AttributeQuery {
    pub assigned_only: Option<String>,
}

// ============================================================================
// Recipes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RecipeDto {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<AttributeDto>,
    pub ingredients: Vec<AttributeDto>,
}

impl From<Recipe> for RecipeDto {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags.into_iter().map(AttributeDto::from).collect(),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(AttributeDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetailDto {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<AttributeDto>,
    pub ingredients: Vec<AttributeDto>,
    pub description: String,
    pub image: Option<String>,
}

impl From<Recipe> for RecipeDetailDto {
    fn from(recipe: Recipe) -> Self {
        let image = recipe.image.as_deref().map(image_url);
        let description = recipe.description.clone();
        let summary = RecipeDto::from(recipe);

        Self {
            id: summary.id,
            title: summary.title,
            time_minutes: summary.time_minutes,
            price: summary.price,
            link: summary.link,
            tags: summary.tags,
            ingredients: summary.ingredients,
            description,
            image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeImageDto {
    pub id: i32,
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

/// Body of POST and PUT. `title`, `time_minutes` and `price` are required.
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<AttributeInput>>,
    pub ingredients: Option<Vec<AttributeInput>>,
}

impl From<RecipeRequest> for RecipeDraft {
    fn from(req: RecipeRequest) -> Self {
        Self {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            tags: req.tags.map(names).unwrap_or_default(),
            ingredients: req.ingredients.map(names).unwrap_or_default(),
        }
    }
}

/// A full replacement still leaves optional fields and links alone when
/// those keys are absent.
impl From<RecipeRequest> for RecipeChanges {
    fn from(req: RecipeRequest) -> Self {
        Self {
            title: Some(req.title),
            time_minutes: Some(req.time_minutes),
            price: Some(req.price),
            link: req.link,
            description: req.description,
            tags: req.tags.map(names),
            ingredients: req.ingredients.map(names),
        }
    }
}

/// Body of PATCH. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatchRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<AttributeInput>>,
    pub ingredients: Option<Vec<AttributeInput>>,
}

impl From<RecipePatchRequest> for RecipeChanges {
    fn from(req: RecipePatchRequest) -> Self {
        Self {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            description: req.description,
            tags: req.tags.map(names),
            ingredients: req.ingredients.map(names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_request_requires_price() {
        let result: Result<RecipeRequest, _> =
            serde_json::from_str(r#"{"title": "Toast", "time_minutes": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_put_without_optional_keys_leaves_them_untouched() {
        let req: RecipeRequest = serde_json::from_str(
            r#"{"title": "Toast", "time_minutes": 2, "price": "1.00"}"#,
        )
        .unwrap();
        let changes = RecipeChanges::from(req);

        assert!(changes.tags.is_none());
        assert!(changes.ingredients.is_none());
        assert!(changes.link.is_none());
        assert!(changes.description.is_none());
    }

    #[test]
    fn test_nested_ids_are_ignored() {
        let req: RecipePatchRequest =
            serde_json::from_str(r#"{"tags": [{"id": 99, "name": "Lunch"}]}"#).unwrap();
        let changes = RecipeChanges::from(req);

        assert_eq!(changes.tags, Some(vec!["Lunch".to_string()]));
        assert!(changes.title.is_none());
    }

    #[test]
    fn test_detail_renders_image_url() {
        let recipe = Recipe {
            id: 3,
            user_id: 1,
            title: "Soup".to_string(),
            time_minutes: 10,
            price: "2.50".parse().unwrap(),
            link: String::new(),
            description: String::new(),
            image: Some("recipe/abc.png".to_string()),
            tags: vec![],
            ingredients: vec![],
            created_at: String::new(),
        };

        let dto = RecipeDetailDto::from(recipe);
        assert_eq!(dto.image.as_deref(), Some("/images/recipe/abc.png"));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["price"], "2.50");
    }
}
