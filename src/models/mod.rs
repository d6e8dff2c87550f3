pub mod filter;
pub mod price;
pub mod recipe;
pub mod user;

pub use filter::{AttributeFilter, FilterError, RecipeFilter};
pub use price::{Price, PriceError};
pub use recipe::{Attribute, AttributeKind, Recipe, RecipeChanges, RecipeDraft};
pub use user::{NewUserFields, ProfileUpdate, User};
