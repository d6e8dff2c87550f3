use crate::config::SecurityConfig;
use crate::models::{
    Attribute, AttributeKind, NewUserFields, ProfileUpdate, Recipe, RecipeChanges, RecipeDraft,
    RecipeFilter, User,
};
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
    TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

use repositories::attribute::{IngredientRepository, TagRepository};

/// A unique index rejected a write. Carried inside `anyhow::Error` so
/// services can `downcast_ref` it into a validation failure.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UniqueViolation(pub String);

pub(crate) fn map_unique_violation(err: DbErr, message: impl Into<String>) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UniqueViolation(message.into()).into(),
        _ => err.into(),
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        fields: &NewUserFields,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(email, password, fields, security)
            .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, update, security).await
    }

    pub async fn get_or_create_token(&self, user_id: i32) -> Result<String> {
        self.user_repo().get_or_create_token(user_id).await
    }

    pub async fn get_user_by_token(&self, key: &str) -> Result<Option<User>> {
        self.user_repo().get_by_token(key).await
    }

    // Recipes

    pub async fn list_recipes(&self, user_id: i32, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        self.recipe_repo().list(user_id, filter).await
    }

    pub async fn get_recipe(&self, user_id: i32, id: i32) -> Result<Option<Recipe>> {
        self.recipe_repo().get(user_id, id).await
    }

    pub async fn create_recipe(&self, user_id: i32, draft: RecipeDraft) -> Result<Recipe> {
        self.recipe_repo().create(user_id, draft).await
    }

    pub async fn update_recipe(
        &self,
        user_id: i32,
        id: i32,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>> {
        self.recipe_repo().update(user_id, id, changes).await
    }

    pub async fn delete_recipe(&self, user_id: i32, id: i32) -> Result<bool> {
        self.recipe_repo().delete(user_id, id).await
    }

    /// Returns the updated recipe and the image it replaced, if any.
    pub async fn set_recipe_image(
        &self,
        user_id: i32,
        id: i32,
        image: &str,
    ) -> Result<Option<(Recipe, Option<String>)>> {
        self.recipe_repo().set_image(user_id, id, image).await
    }

    // Tags & ingredients

    pub async fn list_attributes(
        &self,
        kind: AttributeKind,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>> {
        match kind {
            AttributeKind::Tag => TagRepository::list(&self.conn, user_id, assigned_only).await,
            AttributeKind::Ingredient => {
                IngredientRepository::list(&self.conn, user_id, assigned_only).await
            }
        }
    }

    pub async fn get_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
    ) -> Result<Option<Attribute>> {
        match kind {
            AttributeKind::Tag => TagRepository::get(&self.conn, user_id, id).await,
            AttributeKind::Ingredient => IngredientRepository::get(&self.conn, user_id, id).await,
        }
    }

    pub async fn get_or_create_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        name: &str,
    ) -> Result<Attribute> {
        match kind {
            AttributeKind::Tag => TagRepository::get_or_create(&self.conn, user_id, name).await,
            AttributeKind::Ingredient => {
                IngredientRepository::get_or_create(&self.conn, user_id, name).await
            }
        }
    }

    pub async fn rename_attribute(
        &self,
        kind: AttributeKind,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<Option<Attribute>> {
        match kind {
            AttributeKind::Tag => TagRepository::rename(&self.conn, user_id, id, name).await,
            AttributeKind::Ingredient => {
                IngredientRepository::rename(&self.conn, user_id, id, name).await
            }
        }
    }

    pub async fn delete_attribute(&self, kind: AttributeKind, user_id: i32, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;
        let deleted = match kind {
            AttributeKind::Tag => TagRepository::delete(&txn, user_id, id).await?,
            AttributeKind::Ingredient => IngredientRepository::delete(&txn, user_id, id).await?,
        };
        txn.commit().await?;
        Ok(deleted)
    }
}
