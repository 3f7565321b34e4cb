//! Favorites service: uniqueness and ownership enforcement.
//!
//! The service owns the two favorites invariants:
//!
//! - **Uniqueness**: at most one favorite per `(owner, product_key)`.
//!   Adding an existing product is not an error; the caller receives
//!   [`AddOutcome::AlreadyExists`] and renders idempotent success.
//! - **Ownership**: only the owner may remove a favorite. A remove against
//!   someone else's favorite is [`FavoritesError::Forbidden`], never
//!   `NotFound` — absence and denial are distinct, observable outcomes.

use sqlx::PgPool;
use thiserror::Error;

use pureskin_core::{FavoriteId, UserId};

use crate::db::RepositoryError;
use crate::db::favorites::FavoriteRepository;
use crate::models::favorite::{Favorite, NewFavorite};

/// Errors surfaced by favorites operations.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// No favorite with the given id exists.
    #[error("favorite not found")]
    NotFound,

    /// The favorite exists but belongs to a different user.
    #[error("favorite belongs to another user")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of an add operation.
///
/// Both variants are successes from the client's perspective; the flag only
/// tells the client whether its optimistic insert created anything new.
#[derive(Debug)]
pub enum AddOutcome {
    /// A new favorite was stored.
    Created(Favorite),
    /// The owner already had this product; the stored favorite is returned
    /// unchanged.
    AlreadyExists(Favorite),
}

impl AddOutcome {
    /// Whether the favorite predated this call.
    #[must_use]
    pub const fn already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Favorites service over the repository.
pub struct FavoritesService<'a> {
    repo: FavoriteRepository<'a>,
}

impl<'a> FavoritesService<'a> {
    /// Create a new favorites service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            repo: FavoriteRepository::new(pool),
        }
    }

    /// Add a favorite for the owner, deduplicating on product key.
    ///
    /// A pre-check answers the common case without a failed insert. The
    /// check-then-insert race is resolved by the storage constraint: if a
    /// concurrent add wins between the two steps, the resulting conflict is
    /// converted to `AlreadyExists` by re-reading the winner — exactly one
    /// add creates, the other observes the existing row.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::Repository` on database failure.
    pub async fn add(
        &self,
        owner_id: UserId,
        favorite: NewFavorite,
    ) -> Result<AddOutcome, FavoritesError> {
        if let Some(existing) = self
            .repo
            .find_by_product_key(owner_id, &favorite.product_key)
            .await?
        {
            return Ok(AddOutcome::AlreadyExists(existing));
        }

        match self.repo.insert(owner_id, &favorite).await {
            Ok(created) => Ok(AddOutcome::Created(created)),
            Err(RepositoryError::Conflict(_)) => {
                // Lost the race; the winner's row is the answer.
                let existing = self
                    .repo
                    .find_by_product_key(owner_id, &favorite.product_key)
                    .await?
                    .ok_or_else(|| {
                        FavoritesError::Repository(RepositoryError::Conflict(
                            "favorite vanished between conflicting insert and re-read".to_owned(),
                        ))
                    })?;
                Ok(AddOutcome::AlreadyExists(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List the owner's favorites, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::Repository` on database failure.
    pub async fn list(&self, owner_id: UserId) -> Result<Vec<Favorite>, FavoritesError> {
        Ok(self.repo.list(owner_id).await?)
    }

    /// Remove a favorite, verifying ownership first.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::NotFound` if no favorite has this id (a
    /// repeat of an already-applied remove lands here; the optimistic
    /// client treats it as convergence).
    /// Returns `FavoritesError::Forbidden` if the favorite belongs to a
    /// different user; the record is left untouched.
    pub async fn remove(&self, owner_id: UserId, id: FavoriteId) -> Result<(), FavoritesError> {
        let favorite = self.repo.get(id).await?.ok_or(FavoritesError::NotFound)?;

        if favorite.owner_id != owner_id {
            return Err(FavoritesError::Forbidden);
        }

        // Owner-scoped delete; a concurrent remove that got here first just
        // makes this a no-op.
        self.repo.delete(owner_id, id).await?;
        Ok(())
    }
}
