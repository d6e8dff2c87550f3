//! Domain service for accounts and token authentication.

use crate::db::UniqueViolation;
use crate::models::{ProfileUpdate, User};
use thiserror::Error;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unable to authenticate with provided credentials")]
    InvalidCredentials,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    #[error("User account is disabled")]
    Inactive,

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(violation) = err.downcast_ref::<UniqueViolation>() {
            return Self::Validation(violation.to_string());
        }
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a regular account.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] for an empty or malformed email, a
    /// short password, or an email that is already registered.
    async fn create_user(&self, email: &str, password: &str, name: &str)
    -> Result<User, UserError>;

    /// Registers an account with the staff and superuser flags set.
    async fn create_superuser(&self, email: &str, password: &str) -> Result<User, UserError>;

    /// Verifies credentials and returns the user's token, issuing it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::InvalidCredentials`] for a wrong password, an
    /// unknown email, or an inactive account.
    async fn authenticate(&self, email: &str, password: &str) -> Result<String, UserError>;

    /// Resolves a token presented by a client.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Unauthenticated`] for an unknown token and
    /// [`UserError::Inactive`] when the account has been disabled.
    async fn resolve_token(&self, token: &str) -> Result<User, UserError>;

    async fn get_user(&self, id: i32) -> Result<User, UserError>;

    /// Applies a partial profile change. A new password is re-hashed.
    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<User, UserError>;
}
