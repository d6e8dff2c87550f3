use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::map_unique_violation;
use crate::entities::{auth_tokens, users};
use crate::models::user::normalize_email;
use crate::models::{NewUserFields, ProfileUpdate, User};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Normalizes the email, hashes the password and inserts the account.
    ///
    /// A duplicate email surfaces as [`crate::db::UniqueViolation`].
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        fields: &NewUserFields,
        security: &SecurityConfig,
    ) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            anyhow::bail!("Users must have an email address");
        }

        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let user = users::ActiveModel {
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            name: Set(fields.name.clone()),
            is_active: Set(true),
            is_staff: Set(fields.is_staff),
            is_superuser: Set(fields.is_superuser),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .map_err(|e| map_unique_violation(e, "A user with this email already exists"))?;

        Ok(user.into())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Looks up by normalized email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Returns the user when the password matches, `None` otherwise.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Applies the non-`None` fields of `update`. The password is re-hashed.
    pub async fn update_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();

        if let Some(email) = update.email {
            active.email = Set(normalize_email(&email));
        }
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(password) = update.password {
            let security = security.clone();
            let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
                .await
                .context("Password hashing task panicked")??;
            active.password_hash = Set(new_hash);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .map_err(|e| map_unique_violation(e, "A user with this email already exists"))?;

        Ok(Some(updated.into()))
    }

    /// Returns the user's token, issuing one on first call.
    pub async fn get_or_create_token(&self, user_id: i32) -> Result<String> {
        auth_tokens::Entity::insert(auth_tokens::ActiveModel {
            key: Set(generate_token()),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        })
        .on_conflict(
            OnConflict::column(auth_tokens::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.conn)
        .await
        .context("Failed to issue auth token")?;

        let token = auth_tokens::Entity::find()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query auth token")?
            .ok_or_else(|| anyhow::anyhow!("Auth token missing for user {user_id}"))?;

        Ok(token.key)
    }

    /// Resolves a token to its user
    pub async fn get_by_token(&self, key: &str) -> Result<Option<User>> {
        let row = auth_tokens::Entity::find_by_id(key.to_string())
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query user by token")?;

        Ok(row.and_then(|(_, user)| user).map(User::from))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Params are read back from the PHC string, so hashes made with older
/// settings keep verifying.
pub fn verify_password_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random auth token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
