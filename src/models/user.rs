use serde::{Deserialize, Serialize};
use std::fmt;

/// An account as seen by the rest of the application.
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Optional attributes supplied when creating an account.
#[derive(Debug, Clone, Default)]
pub struct NewUserFields {
    pub name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Changes applied to the caller's own profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Lowercases the domain part of an address, leaving the local part intact.
///
/// Input without an `@` is returned trimmed but otherwise unchanged.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Minimal shape check used by the HTTP layer before touching the store.
#[must_use]
pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
