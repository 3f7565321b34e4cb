//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. Credential material (the password hash) never appears here; it
//! stays inside the repository layer.

use chrono::{DateTime, Utc};

use pureskin_core::{Email, UserId};

/// A gateway account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address, unique across accounts.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The verified identity attached to an authenticated request.
///
/// Produced by the identity verifier after both the bearer token and the
/// account's continued existence have been checked.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
