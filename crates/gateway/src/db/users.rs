//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pureskin_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::user::User;

/// Database row for a user account, including credential material.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_USER: &str = "SELECT id, name, email, password_hash, created_at, updated_at \
                           FROM pureskin.users";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with a display name, email, and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO pureskin.users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, email, password_hash, created_at, updated_at",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        row.into_user()
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if no account exists for the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash = row.password_hash.clone();
        Ok(Some((row.into_user()?, password_hash)))
    }

    /// Update a user's profile fields. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        email: Option<&Email>,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE pureskin.users \
             SET name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, email, password_hash, created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(name)
        .bind(email.map(Email::as_str))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Delete a user account.
    ///
    /// Dependent favorites are removed by the `ON DELETE CASCADE` on
    /// `favorites.owner_id`.
    ///
    /// # Returns
    ///
    /// Returns `true` if the account was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pureskin.users WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
