use serde::{Deserialize, Serialize};
use std::fmt;

use super::price::Price;

/// The two per-user registries a recipe links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tag => "Tag",
            Self::Ingredient => "Ingredient",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag or ingredient owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub description: String,
    /// Path of the stored image relative to the images directory.
    pub image: Option<String>,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
    pub created_at: String,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Everything needed to create a recipe. Tag and ingredient names are
/// get-or-created under the owner.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub description: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// A partial update. `None` leaves the stored value alone; `Some` on
/// `tags` or `ingredients` replaces the whole linked set.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_displays_as_title() {
        let recipe = Recipe {
            id: 1,
            user_id: 1,
            title: "Sample recipe name".to_string(),
            time_minutes: 5,
            price: "5.30".parse().unwrap(),
            link: String::new(),
            description: "Sample recipe description.".to_string(),
            image: None,
            tags: vec![],
            ingredients: vec![],
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        assert_eq!(recipe.to_string(), recipe.title);
    }

    #[test]
    fn test_attribute_kind_names() {
        assert_eq!(AttributeKind::Tag.as_str(), "tag");
        assert_eq!(AttributeKind::Ingredient.label(), "Ingredient");
    }
}
