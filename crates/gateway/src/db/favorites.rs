//! Favorite repository for database operations.
//!
//! This is the only write path to `pureskin.favorites`; the uniqueness
//! constraint on `(owner_id, product_key)` backs up the service-level
//! pre-check, and every delete is owner-scoped in SQL.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pureskin_core::{FavoriteId, FavoriteSource, ProductKey, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::favorite::{Favorite, NewFavorite};

/// Database row for a favorite.
#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    id: Uuid,
    owner_id: i32,
    product_key: String,
    product_name: String,
    brand_name: String,
    price: f64,
    original_price: Option<f64>,
    ingredients: Option<String>,
    similarity: f64,
    category: String,
    product_type: String,
    source: String,
    added_at: DateTime<Utc>,
    notes: Option<String>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: FavoriteId::from_uuid(row.id),
            owner_id: UserId::new(row.owner_id),
            product_key: ProductKey::external(&row.product_key)
                .unwrap_or_else(|| ProductKey::synthesize(&row.brand_name, &row.product_name)),
            product_name: row.product_name,
            brand_name: row.brand_name,
            price: row.price,
            original_price: row.original_price,
            ingredients: row.ingredients,
            similarity: row.similarity,
            category: row.category,
            product_type: row.product_type,
            source: FavoriteSource::from_db(&row.source),
            added_at: row.added_at,
            notes: row.notes,
        }
    }
}

const SELECT_FAVORITE: &str = "SELECT id, owner_id, product_key, product_name, brand_name, \
                               price, original_price, ingredients, similarity, category, \
                               product_type, source, added_at, notes \
                               FROM pureskin.favorites";

/// Repository for favorite database operations.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new favorite for the given owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a
    /// favorite with the same product key (the caller converts this to an
    /// "already exists" outcome).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        owner_id: UserId,
        favorite: &NewFavorite,
    ) -> Result<Favorite, RepositoryError> {
        let row: FavoriteRow = sqlx::query_as(
            "INSERT INTO pureskin.favorites \
             (id, owner_id, product_key, product_name, brand_name, price, original_price, \
              ingredients, similarity, category, product_type, source, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING id, owner_id, product_key, product_name, brand_name, price, \
                       original_price, ingredients, similarity, category, product_type, \
                       source, added_at, notes",
        )
        .bind(FavoriteId::generate().as_uuid())
        .bind(owner_id.as_i32())
        .bind(favorite.product_key.as_str())
        .bind(&favorite.product_name)
        .bind(&favorite.brand_name)
        .bind(favorite.price)
        .bind(favorite.original_price)
        .bind(&favorite.ingredients)
        .bind(favorite.similarity)
        .bind(&favorite.category)
        .bind(&favorite.product_type)
        .bind(favorite.source.as_str())
        .bind(&favorite.notes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "favorite already exists for this product"))?;

        Ok(row.into())
    }

    /// Find an owner's favorite by product key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_product_key(
        &self,
        owner_id: UserId,
        product_key: &ProductKey,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let row: Option<FavoriteRow> = sqlx::query_as(&format!(
            "{SELECT_FAVORITE} WHERE owner_id = $1 AND product_key = $2"
        ))
        .bind(owner_id.as_i32())
        .bind(product_key.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a favorite by id, regardless of owner.
    ///
    /// The caller is responsible for the ownership check; absence and
    /// ownership mismatch must map to different client errors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FavoriteId) -> Result<Option<Favorite>, RepositoryError> {
        let row: Option<FavoriteRow> =
            sqlx::query_as(&format!("{SELECT_FAVORITE} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// List an owner's favorites, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(&format!(
            "{SELECT_FAVORITE} WHERE owner_id = $1 ORDER BY added_at DESC, id"
        ))
        .bind(owner_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Collect the product keys of an owner's favorites.
    ///
    /// Used to annotate dupe-search results with `isFavorite` without
    /// loading full rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_keys(
        &self,
        owner_id: UserId,
    ) -> Result<HashSet<String>, RepositoryError> {
        let keys: Vec<(String,)> =
            sqlx::query_as("SELECT product_key FROM pureskin.favorites WHERE owner_id = $1")
                .bind(owner_id.as_i32())
                .fetch_all(self.pool)
                .await?;

        Ok(keys.into_iter().map(|(k,)| k).collect())
    }

    /// Delete an owner's favorite by id.
    ///
    /// The owner scoping in the statement is a second line of defense; the
    /// service checks ownership first to distinguish `Forbidden` from
    /// `NotFound`.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was deleted, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        owner_id: UserId,
        id: FavoriteId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM pureskin.favorites WHERE id = $1 AND owner_id = $2")
                .bind(id.as_uuid())
                .bind(owner_id.as_i32())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
