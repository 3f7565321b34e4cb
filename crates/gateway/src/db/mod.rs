//! Database operations for the gateway `PostgreSQL` instance.
//!
//! # Schema: `pureskin`
//!
//! ## Tables
//!
//! - `users` - Gateway accounts (name, email, Argon2id password hash)
//! - `favorites` - Per-user saved products, unique per
//!   `(owner_id, product_key)`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/gateway/migrations/` and run via:
//! ```bash
//! cargo run -p pureskin-cli -- migrate
//! ```
//!
//! Queries use the runtime `sqlx::query`/`query_as` API with explicit row
//! structs; no offline query cache is committed to this repository.

pub mod favorites;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced row does not exist.
    #[error("row not found")]
    NotFound,

    /// A stored value could not be mapped back into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, converting unique-constraint violations to
/// [`RepositoryError::Conflict`] with the given message.
fn map_unique_violation(e: sqlx::Error, conflict_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(conflict_message.to_owned());
    }
    RepositoryError::Database(e)
}
