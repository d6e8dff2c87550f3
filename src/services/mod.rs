pub mod image;
pub use image::{ImageFormat, ImageService};

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod recipe_service;
pub mod recipe_service_impl;
pub use recipe_service::{RecipeError, RecipeImage, RecipeService};
pub use recipe_service_impl::SeaOrmRecipeService;
