//! Favorite domain types.
//!
//! A [`Favorite`] is one user's saved reference to a product, carrying
//! denormalized display fields so the client can render a saved list without
//! re-querying the analysis engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

use pureskin_core::{FavoriteId, FavoriteSource, ProductKey, UserId};

/// A stored favorite (domain type).
#[derive(Debug, Clone)]
pub struct Favorite {
    /// Opaque identifier, generated at creation.
    pub id: FavoriteId,
    /// Owning user; immutable after creation.
    pub owner_id: UserId,
    /// Canonical product identification key (uniqueness key per owner).
    pub product_key: ProductKey,
    /// Product display name.
    pub product_name: String,
    /// Brand display name.
    pub brand_name: String,
    /// Current price; non-negative.
    pub price: f64,
    /// Price before discount, when known.
    pub original_price: Option<f64>,
    /// Ingredient list text.
    pub ingredients: Option<String>,
    /// Similarity score in [0, 1] from the analysis that surfaced this product.
    pub similarity: f64,
    /// Primary category, "Unknown" when not classified.
    pub category: String,
    /// Product type, "unknown" when not classified.
    pub product_type: String,
    /// Where the favorite came from.
    pub source: FavoriteSource,
    /// Creation timestamp; immutable.
    pub added_at: DateTime<Utc>,
    /// Free-form user notes.
    pub notes: Option<String>,
}

impl Favorite {
    /// Amount saved versus the original price.
    ///
    /// Present only when an original price is known and actually higher
    /// than the current price.
    #[must_use]
    pub fn savings(&self) -> Option<f64> {
        match self.original_price {
            Some(original) if original > self.price => Some(original - self.price),
            _ => None,
        }
    }

    /// Savings as a percentage of the original price.
    #[must_use]
    pub fn savings_percentage(&self) -> Option<f64> {
        self.savings().and_then(|savings| {
            self.original_price
                .map(|original| savings / original * 100.0)
        })
    }
}

/// Validation failures when constructing a [`NewFavorite`].
#[derive(Debug, Error)]
pub enum InvalidFavorite {
    #[error("productName is required")]
    MissingProductName,
    #[error("brandName is required")]
    MissingBrandName,
    #[error("price must be non-negative")]
    NegativePrice,
    #[error("originalPrice must be non-negative")]
    NegativeOriginalPrice,
    #[error("similarity must be between 0 and 1")]
    SimilarityOutOfRange,
    #[error("notes must be at most {max} characters")]
    NotesTooLong { max: usize },
}

/// A validated favorite ready for insertion.
///
/// Construction enforces the field-level invariants; the repository adds
/// the id, owner scoping, and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub product_key: ProductKey,
    pub product_name: String,
    pub brand_name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub ingredients: Option<String>,
    pub similarity: f64,
    pub category: String,
    pub product_type: String,
    pub source: FavoriteSource,
    pub notes: Option<String>,
}

/// Maximum accepted length for user notes.
const MAX_NOTES_LENGTH: usize = 2_000;

/// Unvalidated favorite fields as supplied by a client.
#[derive(Debug, Clone, Default)]
pub struct FavoriteInput {
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

impl NewFavorite {
    /// Validate client-supplied fields into an insertable favorite.
    ///
    /// Display strings are trimmed; blank optional strings collapse to
    /// their defaults ("Unknown"/"unknown") or to `None`. The product key
    /// is the supplied one when present, otherwise synthesized from brand
    /// and name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFavorite`] when a required field is blank, a price
    /// is negative, or the similarity is outside [0, 1].
    pub fn from_input(input: FavoriteInput) -> Result<Self, InvalidFavorite> {
        let product_name = input.product_name.trim().to_owned();
        if product_name.is_empty() {
            return Err(InvalidFavorite::MissingProductName);
        }

        let brand_name = input.brand_name.trim().to_owned();
        if brand_name.is_empty() {
            return Err(InvalidFavorite::MissingBrandName);
        }

        let price = input.price.unwrap_or(0.0);
        if !price.is_finite() || price < 0.0 {
            return Err(InvalidFavorite::NegativePrice);
        }

        if let Some(original) = input.original_price
            && (!original.is_finite() || original < 0.0)
        {
            return Err(InvalidFavorite::NegativeOriginalPrice);
        }

        let similarity = input.similarity.unwrap_or(0.0);
        if !similarity.is_finite() || !(0.0..=1.0).contains(&similarity) {
            return Err(InvalidFavorite::SimilarityOutOfRange);
        }

        let notes = input.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        if let Some(ref notes) = notes
            && notes.chars().count() > MAX_NOTES_LENGTH
        {
            return Err(InvalidFavorite::NotesTooLong {
                max: MAX_NOTES_LENGTH,
            });
        }

        let product_key =
            ProductKey::resolve(input.product_key.as_deref(), &brand_name, &product_name);

        Ok(Self {
            product_key,
            product_name,
            brand_name,
            price,
            original_price: input.original_price,
            ingredients: non_blank(input.ingredients),
            similarity,
            category: non_blank(input.category).unwrap_or_else(|| "Unknown".to_owned()),
            product_type: non_blank(input.product_type).unwrap_or_else(|| "unknown".to_owned()),
            source: input.source.unwrap_or_default(),
            notes,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn favorite_with_prices(price: f64, original_price: Option<f64>) -> Favorite {
        Favorite {
            id: FavoriteId::generate(),
            owner_id: UserId::new(1),
            product_key: ProductKey::synthesize("CeraVe", "Hydrating Cleanser"),
            product_name: "Hydrating Cleanser".to_owned(),
            brand_name: "CeraVe".to_owned(),
            price,
            original_price,
            ingredients: None,
            similarity: 0.9,
            category: "Cleanser".to_owned(),
            product_type: "cleanser".to_owned(),
            source: FavoriteSource::DupeSearch,
            added_at: Utc::now(),
            notes: None,
        }
    }

    fn valid_input() -> FavoriteInput {
        FavoriteInput {
            product_name: "Hydrating Cleanser".to_owned(),
            brand_name: "CeraVe".to_owned(),
            ..FavoriteInput::default()
        }
    }

    #[test]
    fn test_savings_derivation() {
        let favorite = favorite_with_prices(20.0, Some(40.0));
        assert_eq!(favorite.savings(), Some(20.0));
        assert_eq!(favorite.savings_percentage(), Some(50.0));
    }

    #[test]
    fn test_no_savings_without_original_price() {
        let favorite = favorite_with_prices(20.0, None);
        assert_eq!(favorite.savings(), None);
        assert_eq!(favorite.savings_percentage(), None);
    }

    #[test]
    fn test_no_savings_when_original_not_higher() {
        let favorite = favorite_with_prices(20.0, Some(20.0));
        assert_eq!(favorite.savings(), None);

        let favorite = favorite_with_prices(20.0, Some(15.0));
        assert_eq!(favorite.savings(), None);
        assert_eq!(favorite.savings_percentage(), None);
    }

    #[test]
    fn test_from_input_applies_defaults() {
        let favorite = NewFavorite::from_input(valid_input()).unwrap();
        assert_eq!(favorite.price, 0.0);
        assert_eq!(favorite.similarity, 0.0);
        assert_eq!(favorite.category, "Unknown");
        assert_eq!(favorite.product_type, "unknown");
        assert_eq!(favorite.source, FavoriteSource::Manual);
        assert_eq!(favorite.product_key.as_str(), "cerave-hydrating-cleanser");
    }

    #[test]
    fn test_from_input_trims_display_strings() {
        let mut input = valid_input();
        input.product_name = "  Hydrating Cleanser  ".to_owned();
        input.brand_name = "  CeraVe ".to_owned();
        let favorite = NewFavorite::from_input(input).unwrap();
        assert_eq!(favorite.product_name, "Hydrating Cleanser");
        assert_eq!(favorite.brand_name, "CeraVe");
    }

    #[test]
    fn test_from_input_requires_names() {
        let mut input = valid_input();
        input.product_name = "   ".to_owned();
        assert!(matches!(
            NewFavorite::from_input(input),
            Err(InvalidFavorite::MissingProductName)
        ));

        let mut input = valid_input();
        input.brand_name = String::new();
        assert!(matches!(
            NewFavorite::from_input(input),
            Err(InvalidFavorite::MissingBrandName)
        ));
    }

    #[test]
    fn test_from_input_rejects_negative_prices() {
        let mut input = valid_input();
        input.price = Some(-1.0);
        assert!(matches!(
            NewFavorite::from_input(input),
            Err(InvalidFavorite::NegativePrice)
        ));

        let mut input = valid_input();
        input.original_price = Some(-0.01);
        assert!(matches!(
            NewFavorite::from_input(input),
            Err(InvalidFavorite::NegativeOriginalPrice)
        ));
    }

    #[test]
    fn test_from_input_rejects_similarity_out_of_range() {
        let mut input = valid_input();
        input.similarity = Some(1.5);
        assert!(matches!(
            NewFavorite::from_input(input),
            Err(InvalidFavorite::SimilarityOutOfRange)
        ));

        let mut input = valid_input();
        input.similarity = Some(f64::NAN);
        assert!(NewFavorite::from_input(input).is_err());
    }

    #[test]
    fn test_from_input_prefers_supplied_product_key() {
        let mut input = valid_input();
        input.product_key = Some("sephora:991".to_owned());
        let favorite = NewFavorite::from_input(input).unwrap();
        assert_eq!(favorite.product_key.as_str(), "sephora:991");
    }

    #[test]
    fn test_from_input_drops_blank_optionals() {
        let mut input = valid_input();
        input.ingredients = Some("   ".to_owned());
        input.notes = Some(String::new());
        input.category = Some(" ".to_owned());
        let favorite = NewFavorite::from_input(input).unwrap();
        assert_eq!(favorite.ingredients, None);
        assert_eq!(favorite.notes, None);
        assert_eq!(favorite.category, "Unknown");
    }
}
