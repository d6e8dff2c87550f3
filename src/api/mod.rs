use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod attributes;
pub mod auth;
mod error;
mod observability;
mod recipes;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{RecipeService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn recipe_service(&self) -> &Arc<dyn RecipeService> {
        &self.shared.recipe_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let images_path = state.config().general.images_path.clone();
    let cors_origins = state.config().server.cors_allowed_origins.clone();
    let body_limit = state.config().server.max_upload_bytes;

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/user/create", post(users::create_user))
        .route("/user/token", post(users::create_token))
        .route("/health", get(system::health))
        .route("/health/live", get(system::health_live))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/images", tower_http::services::ServeDir::new(images_path))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/user/me",
            get(users::get_me)
                .put(users::update_me)
                .patch(users::patch_me),
        )
        .route(
            "/recipe/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipe/recipes/{id}",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .patch(recipes::patch_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipe/recipes/{id}/upload-image",
            post(recipes::upload_image),
        )
        .route("/recipe/tags", get(attributes::list_tags))
        .route(
            "/recipe/tags/{id}",
            put(attributes::update_tag)
                .patch(attributes::patch_tag)
                .delete(attributes::delete_tag),
        )
        .route("/recipe/ingredients", get(attributes::list_ingredients))
        .route(
            "/recipe/ingredients/{id}",
            put(attributes::update_ingredient)
                .patch(attributes::patch_ingredient)
                .delete(attributes::delete_ingredient),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
