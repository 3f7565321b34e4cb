//! Favorites route handlers.
//!
//! # Client sync contract
//!
//! The client applies mutations to its local view before the server
//! confirms them (optimistic updates), so this surface is built for
//! retries and reconciliation rather than transactions:
//!
//! - **Add** of a product the owner already saved is a success: HTTP 200
//!   with `alreadyExists: true` and the stored favorite. Retrying an add
//!   that raced a concurrent duplicate lands in the same place.
//! - **Remove** of an id that is already gone returns 404; the optimistic
//!   client treats that as convergence, not failure. Removing someone
//!   else's favorite returns 403 and changes nothing — absence and denial
//!   are deliberately distinguishable.
//! - There is no diff/patch API. After any failed mutation the client is
//!   expected to reload full state from `GET /favorites`, which returns
//!   the owner's favorites newest-first.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pureskin_core::{FavoriteId, FavoriteSource};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::favorite::{Favorite, FavoriteInput, NewFavorite};
use crate::services::favorites::{AddOutcome, FavoritesService};
use crate::state::AppState;

/// Add-favorite request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    /// Stable product key when the client has one (e.g., from a dupe
    /// search result); synthesized from brand + name otherwise.
    pub product_key: Option<String>,
    pub product_name: String,
    pub brand_name: String,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub ingredients: Option<String>,
    pub similarity: Option<f64>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub source: Option<FavoriteSource>,
    pub notes: Option<String>,
}

impl From<AddFavoriteRequest> for FavoriteInput {
    fn from(body: AddFavoriteRequest) -> Self {
        Self {
            product_key: body.product_key,
            product_name: body.product_name,
            brand_name: body.brand_name,
            price: body.price,
            original_price: body.original_price,
            ingredients: body.ingredients,
            similarity: body.similarity,
            category: body.category,
            product_type: body.product_type,
            source: body.source,
            notes: body.notes,
        }
    }
}

/// A favorite in the client contract, with derived savings fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDto {
    pub id: FavoriteId,
    pub product_key: String,
    pub product_name: String,
    pub brand_name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    pub similarity: f64,
    pub category: String,
    pub product_type: String,
    pub source: FavoriteSource,
    pub added_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<Favorite> for FavoriteDto {
    fn from(favorite: Favorite) -> Self {
        let savings = favorite.savings();
        let savings_percentage = favorite.savings_percentage();
        Self {
            id: favorite.id,
            product_key: favorite.product_key.into_inner(),
            product_name: favorite.product_name,
            brand_name: favorite.brand_name,
            price: favorite.price,
            original_price: favorite.original_price,
            savings,
            savings_percentage,
            ingredients: favorite.ingredients,
            similarity: favorite.similarity,
            category: favorite.category,
            product_type: favorite.product_type,
            source: favorite.source,
            added_at: favorite.added_at,
            notes: favorite.notes,
        }
    }
}

/// Add-favorite response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteResponse {
    pub favorite: FavoriteDto,
    /// True when the owner already had this product; the stored favorite
    /// is returned unchanged.
    pub already_exists: bool,
}

/// List-favorites response, newest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesList {
    pub count: usize,
    pub favorites: Vec<FavoriteDto>,
}

/// Remove-favorite response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFavoriteResponse {
    pub removed: bool,
}

/// Add a favorite for the verified caller.
///
/// Duplicate adds are idempotent successes, not errors (see the module
/// docs).
#[instrument(skip(state, auth, body), fields(user_id = %auth.0.id))]
pub async fn add(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<Json<AddFavoriteResponse>> {
    let favorite = NewFavorite::from_input(body.into())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = FavoritesService::new(state.pool())
        .add(auth.0.id, favorite)
        .await?;

    let already_exists = outcome.already_exists();
    let favorite = match outcome {
        AddOutcome::Created(f) | AddOutcome::AlreadyExists(f) => f,
    };

    tracing::debug!(
        favorite_id = %favorite.id,
        already_exists,
        "favorite add resolved"
    );

    Ok(Json(AddFavoriteResponse {
        favorite: favorite.into(),
        already_exists,
    }))
}

/// List the caller's favorites, most recently added first.
#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn list(State(state): State<AppState>, auth: RequireAuth) -> Result<Json<FavoritesList>> {
    let favorites = FavoritesService::new(state.pool()).list(auth.0.id).await?;

    Ok(Json(FavoritesList {
        count: favorites.len(),
        favorites: favorites.into_iter().map(Into::into).collect(),
    }))
}

/// Remove one of the caller's favorites.
#[instrument(skip(state, auth), fields(user_id = %auth.0.id, favorite_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<FavoriteId>,
) -> Result<Json<RemoveFavoriteResponse>> {
    FavoritesService::new(state.pool())
        .remove(auth.0.id, id)
        .await?;

    Ok(Json(RemoveFavoriteResponse { removed: true }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pureskin_core::{ProductKey, UserId};

    fn stored_favorite() -> Favorite {
        Favorite {
            id: FavoriteId::generate(),
            owner_id: UserId::new(3),
            product_key: ProductKey::synthesize("CeraVe", "Hydrating Cleanser"),
            product_name: "Hydrating Cleanser".to_owned(),
            brand_name: "CeraVe".to_owned(),
            price: 20.0,
            original_price: Some(40.0),
            ingredients: Some("Aqua, Glycerin, Ceramides".to_owned()),
            similarity: 0.92,
            category: "Cleanser".to_owned(),
            product_type: "cleanser".to_owned(),
            source: FavoriteSource::DupeSearch,
            added_at: Utc::now(),
            notes: None,
        }
    }

    #[test]
    fn test_dto_carries_derived_savings() {
        let dto: FavoriteDto = stored_favorite().into();
        assert_eq!(dto.savings, Some(20.0));
        assert_eq!(dto.savings_percentage, Some(50.0));
    }

    #[test]
    fn test_dto_wire_format_is_camel_case() {
        let dto: FavoriteDto = stored_favorite().into();
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json.get("productName").unwrap(), "Hydrating Cleanser");
        assert_eq!(json.get("brandName").unwrap(), "CeraVe");
        assert_eq!(json.get("productKey").unwrap(), "cerave-hydrating-cleanser");
        assert_eq!(json.get("savingsPercentage").unwrap(), 50.0);
        assert_eq!(json.get("source").unwrap(), "dupe-search");
        assert!(json.get("addedAt").is_some());
        // no snake_case leakage
        assert!(json.get("product_name").is_none());
        // absent optionals are omitted, not null
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_add_request_maps_to_input() {
        let body: AddFavoriteRequest = serde_json::from_str(
            r#"{
                "productName": "Hydro Boost",
                "brandName": "Neutrogena",
                "price": 18.99,
                "originalPrice": 40.0,
                "similarity": 0.91,
                "source": "dupe-search"
            }"#,
        )
        .unwrap();

        let input: FavoriteInput = body.into();
        let favorite = NewFavorite::from_input(input).unwrap();
        assert_eq!(favorite.product_key.as_str(), "neutrogena-hydro-boost");
        assert_eq!(favorite.source, FavoriteSource::DupeSearch);
        assert_eq!(favorite.price, 18.99);
    }
}
