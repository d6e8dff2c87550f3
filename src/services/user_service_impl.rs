//! `SeaORM` implementation of the `UserService` trait.

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::models::user::looks_like_email;
use crate::models::{NewUserFields, ProfileUpdate, User};
use crate::services::user_service::{UserError, UserService};
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn check_password(&self, password: &str) -> Result<(), UserError> {
        let min = self.security.min_password_length;
        if password.chars().count() < min {
            return Err(UserError::Validation(format!(
                "Password must be at least {min} characters"
            )));
        }
        Ok(())
    }

    fn check_email(email: &str) -> Result<(), UserError> {
        if email.trim().is_empty() {
            return Err(UserError::Validation(
                "Users must have an email address".to_string(),
            ));
        }
        if !looks_like_email(email) {
            return Err(UserError::Validation(
                "Enter a valid email address".to_string(),
            ));
        }
        Ok(())
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        fields: NewUserFields,
    ) -> Result<User, UserError> {
        Self::check_email(email)?;
        self.check_password(password)?;

        let user = self
            .store
            .create_user(email, password, &fields, &self.security)
            .await?;

        info!(
            user_id = user.id,
            superuser = user.is_superuser,
            "Registered user {}",
            user
        );
        Ok(user)
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, UserError> {
        let fields = NewUserFields {
            name: name.trim().to_string(),
            ..NewUserFields::default()
        };
        self.register(email, password, fields).await
    }

    async fn create_superuser(&self, email: &str, password: &str) -> Result<User, UserError> {
        let fields = NewUserFields {
            is_staff: true,
            is_superuser: true,
            ..NewUserFields::default()
        };
        self.register(email, password, fields).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<String, UserError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(UserError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active {
            warn!(user_id = user.id, "Rejected login for inactive user");
            return Err(UserError::InvalidCredentials);
        }

        Ok(self.store.get_or_create_token(user.id).await?)
    }

    async fn resolve_token(&self, token: &str) -> Result<User, UserError> {
        if token.is_empty() {
            return Err(UserError::Unauthenticated);
        }

        let user = self
            .store
            .get_user_by_token(token)
            .await?
            .ok_or(UserError::Unauthenticated)?;

        if !user.is_active {
            return Err(UserError::Inactive);
        }

        Ok(user)
    }

    async fn get_user(&self, id: i32) -> Result<User, UserError> {
        self.store.get_user(id).await?.ok_or(UserError::NotFound)
    }

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<User, UserError> {
        if let Some(email) = &update.email {
            Self::check_email(email)?;
        }
        if let Some(password) = &update.password {
            self.check_password(password)?;
        }

        self.store
            .update_user_profile(id, update, &self.security)
            .await?
            .ok_or(UserError::NotFound)
    }
}
