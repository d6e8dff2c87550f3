use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ImageService, RecipeService, SeaOrmRecipeService, SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub image_service: Arc<ImageService>,

    pub user_service: Arc<dyn UserService>,

    pub recipe_service: Arc<dyn RecipeService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already-connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let image_service = Arc::new(ImageService::new(&config.general.images_path));

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService + Send + Sync + 'static>;

        let recipe_service = Arc::new(SeaOrmRecipeService::new(
            store.clone(),
            image_service.clone(),
        )) as Arc<dyn RecipeService + Send + Sync + 'static>;

        Self {
            config: Arc::new(config),
            store,
            image_service,
            user_service,
            recipe_service,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
