//! Analysis proxy route handlers.
//!
//! Each handler validates its input locally, forwards the call to the
//! engine client, and reshapes the engine's snake_case wire types into the
//! gateway's camelCase client contract. Engine failures arrive already
//! normalized; only two handlers add policy of their own:
//!
//! - `dupes` annotates results with `isFavorite` when the caller presented
//!   a valid bearer token — a best-effort enrichment whose failures are
//!   logged and swallowed, never surfaced;
//! - `sentiment` degrades to `{sentiment: "unavailable", confidence: 0}`
//!   on any engine failure, because sentiment is advisory.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pureskin_core::ProductKey;

use crate::db::favorites::FavoriteRepository;
use crate::engine::types::{
    DupeQuery, EngineProduct, FilterCatalog, QualityQuery, RecommendQuery, ReviewQuery,
    ScanOutcome,
};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Maximum accepted scan payload: 10 MiB, checked before any engine call.
pub const MAX_SCAN_BYTES: usize = 10 * 1024 * 1024;

/// Minimum ingredient text length for a dupe search.
const MIN_INGREDIENTS_LENGTH: usize = 5;

/// How many candidates to request from the engine per dupe search.
const DUPE_TOP_N: u32 = 20;

// =============================================================================
// Duplicate search
// =============================================================================

/// Duplicate search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DupeSearchRequest {
    pub ingredients: String,
    pub brand: Option<String>,
    pub product_type: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

/// One dupe-search result in the client contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DupeResult {
    /// Canonical key for this product; echo it back when adding a favorite.
    pub product_key: String,
    pub product_name: String,
    pub brand_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_economic_dupe: Option<bool>,
    /// Present only when the caller was authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl From<EngineProduct> for DupeResult {
    fn from(product: EngineProduct) -> Self {
        let product_key =
            ProductKey::synthesize(&product.brand_name, &product.product_name).into_inner();
        Self {
            product_key,
            product_name: product.product_name,
            brand_name: product.brand_name,
            ingredients: product.ingredients,
            price: product.price,
            similarity: product.similarity,
            category: product.primary_category,
            product_type: product.secondary_category,
            rating: product.rating,
            savings_amount: product.savings_amount,
            is_economic_dupe: product.is_economic_dupe,
            is_favorite: None,
        }
    }
}

/// Duplicate search response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DupeSearchResponse {
    pub count: usize,
    pub results: Vec<DupeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Find cheaper products with a similar ingredient profile.
#[instrument(skip_all, fields(authenticated = auth.is_some()))]
pub async fn dupes(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Json(body): Json<DupeSearchRequest>,
) -> Result<Json<DupeSearchResponse>> {
    let ingredients = validate_ingredients(&body.ingredients)?;

    let query = DupeQuery {
        ingredients,
        brand: body.brand.filter(|b| !b.trim().is_empty()),
        target_price: body.price.unwrap_or(0.0),
        primary_category: category_filter(body.category),
        secondary_category: body.product_type.filter(|t| !t.trim().is_empty()),
        top_n: DUPE_TOP_N,
    };

    let outcome = state.engine().find_dupes(&query).await?;
    let message = outcome.message.clone();
    let mut results: Vec<DupeResult> = outcome.into_results().into_iter().map(Into::into).collect();

    // Best-effort favorite annotation; a failed lookup degrades the
    // enrichment, not the search.
    if let Some(user) = auth {
        match FavoriteRepository::new(state.pool()).product_keys(user.id).await {
            Ok(keys) => annotate_favorites(&mut results, &keys),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user.id, "favorite annotation skipped");
            }
        }
    }

    Ok(Json(DupeSearchResponse {
        count: results.len(),
        results,
        message,
    }))
}

/// Validate dupe-search ingredient text: trimmed, at least 5 characters.
fn validate_ingredients(raw: &str) -> Result<String> {
    let ingredients = raw.trim();
    if ingredients.chars().count() < MIN_INGREDIENTS_LENGTH {
        return Err(AppError::Validation(format!(
            "ingredients text must be at least {MIN_INGREDIENTS_LENGTH} characters"
        )));
    }
    Ok(ingredients.to_owned())
}

/// Normalize the category filter: "All" (any case) and blanks mean no filter.
fn category_filter(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
}

/// Mark results whose synthesized key appears in the caller's favorites.
fn annotate_favorites(results: &mut [DupeResult], favorite_keys: &HashSet<String>) {
    for result in results {
        result.is_favorite = Some(favorite_keys.contains(&result.product_key));
    }
}

// =============================================================================
// Sentiment
// =============================================================================

/// Sentiment analysis request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRequest {
    pub text: String,
    pub skin_type: Option<String>,
}

/// Sentiment analysis response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResponse {
    pub sentiment: String,
    pub confidence: f64,
}

impl SentimentResponse {
    /// The degraded answer used when the engine cannot be consulted.
    fn unavailable() -> Self {
        Self {
            sentiment: "unavailable".to_owned(),
            confidence: 0.0,
        }
    }
}

/// Analyze review text.
///
/// Sentiment is advisory: if the engine is down, busy, or otherwise
/// failing, the client gets a well-formed degraded answer with HTTP 200
/// instead of an error.
#[instrument(skip_all)]
pub async fn sentiment(
    State(state): State<AppState>,
    Json(body): Json<SentimentRequest>,
) -> Result<Json<SentimentResponse>> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text is required".to_owned()));
    }

    let query = ReviewQuery {
        text: text.to_owned(),
        skin_type: body
            .skin_type
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "All".to_owned()),
    };

    let response = match state.engine().analyze_review(&query).await {
        Ok(analysis) => SentimentResponse {
            sentiment: analysis.sentiment,
            confidence: analysis.confidence,
        },
        Err(e) => {
            tracing::warn!(error = %e, "sentiment analysis degraded");
            SentimentResponse::unavailable()
        }
    };

    Ok(Json(response))
}

// =============================================================================
// Image scan
// =============================================================================

/// Scan a product photo: OCR + database match + analysis.
///
/// Multipart upload, field `file`. Payloads over 10 MiB are rejected
/// before the engine is contacted.
#[instrument(skip_all)]
pub async fn scan(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScanOutcome>> {
    let mut file: Option<(Vec<u8>, String, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .unwrap_or("upload.jpg")
            .to_owned();
        let content_type = field.content_type().map(ToOwned::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        file = Some((bytes.to_vec(), file_name, content_type));
        break;
    }

    let Some((payload, file_name, content_type)) = file else {
        return Err(AppError::Validation(
            "multipart field \"file\" is required".to_owned(),
        ));
    };

    ensure_scan_size(payload.len())?;

    let outcome = state
        .engine()
        .scan_image(payload, file_name, content_type)
        .await?;

    Ok(Json(outcome))
}

/// Enforce the 10 MiB scan payload limit.
fn ensure_scan_size(len: usize) -> Result<()> {
    if len > MAX_SCAN_BYTES {
        return Err(AppError::PayloadTooLarge);
    }
    Ok(())
}

// =============================================================================
// Quality analysis
// =============================================================================

/// Quality analysis request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRequest {
    pub product_name: String,
    pub brand_name: Option<String>,
    pub ingredients: Option<String>,
}

/// Run the engine's full quality report for a named product.
///
/// The report is passed through untouched; its shape belongs to the
/// engine.
#[instrument(skip_all, fields(product_name = %body.product_name))]
pub async fn quality(
    State(state): State<AppState>,
    Json(body): Json<QualityRequest>,
) -> Result<Json<serde_json::Value>> {
    let product_name = body.product_name.trim();
    if product_name.is_empty() {
        return Err(AppError::Validation("productName is required".to_owned()));
    }

    let query = QualityQuery {
        product_name: product_name.to_owned(),
        brand_name: body.brand_name.unwrap_or_default(),
        ingredients: body.ingredients.unwrap_or_default(),
    };

    let report = state.engine().analyze_quality(&query).await?;
    Ok(Json(report))
}

// =============================================================================
// Recommendations & filters
// =============================================================================

/// Recommendation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub skin_type: String,
    pub max_price: Option<f64>,
    pub category: Option<String>,
}

/// Recommendation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub count: usize,
    pub recommendations: Vec<DupeResult>,
}

/// Fetch product recommendations for a skin type.
#[instrument(skip_all, fields(skin_type = %body.skin_type))]
pub async fn recommend(
    State(state): State<AppState>,
    Json(body): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>> {
    let skin_type = body.skin_type.trim();
    if skin_type.is_empty() {
        return Err(AppError::Validation("skinType is required".to_owned()));
    }

    let query = RecommendQuery {
        skin_type: skin_type.to_owned(),
        max_price: body.max_price,
        category: category_filter(body.category),
    };

    let outcome = state.engine().recommend(&query).await?;
    let recommendations: Vec<DupeResult> = outcome
        .recommendations
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(RecommendResponse {
        count: recommendations.len(),
        recommendations,
    }))
}

/// Fetch the engine's category/brand/type catalog.
#[instrument(skip_all)]
pub async fn filters(State(state): State<AppState>) -> Result<Json<FilterCatalog>> {
    let catalog = state.engine().filters().await?;
    Ok(Json(catalog))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(brand: &str, name: &str) -> EngineProduct {
        EngineProduct {
            product_name: name.to_owned(),
            brand_name: brand.to_owned(),
            ingredients: None,
            price: Some(10.0),
            similarity: Some(0.8),
            primary_category: None,
            secondary_category: None,
            rating: None,
            savings_amount: None,
            is_economic_dupe: None,
        }
    }

    #[test]
    fn test_validate_ingredients_boundary() {
        // 4 characters fail, 5 pass
        assert!(validate_ingredients("abcd").is_err());
        assert_eq!(validate_ingredients("abcde").unwrap(), "abcde");
        // trimming happens before the length check
        assert!(validate_ingredients("  ab  ").is_err());
        assert_eq!(validate_ingredients("  aqua, glycerin  ").unwrap(), "aqua, glycerin");
    }

    #[test]
    fn test_validate_ingredients_rejects_empty() {
        let err = validate_ingredients("").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_category_filter_all_means_unfiltered() {
        assert_eq!(category_filter(Some("All".to_owned())), None);
        assert_eq!(category_filter(Some("all".to_owned())), None);
        assert_eq!(category_filter(Some("  ".to_owned())), None);
        assert_eq!(category_filter(None), None);
        assert_eq!(
            category_filter(Some("Moisturizer".to_owned())),
            Some("Moisturizer".to_owned())
        );
    }

    #[test]
    fn test_ensure_scan_size_boundary() {
        assert!(ensure_scan_size(MAX_SCAN_BYTES).is_ok());
        assert!(matches!(
            ensure_scan_size(MAX_SCAN_BYTES + 1),
            Err(AppError::PayloadTooLarge)
        ));
    }

    #[test]
    fn test_annotate_favorites_marks_known_keys() {
        let mut results: Vec<DupeResult> = vec![
            product("CeraVe", "Hydrating Cleanser").into(),
            product("Neutrogena", "Hydro Boost").into(),
        ];

        let keys: HashSet<String> = ["cerave-hydrating-cleanser".to_owned()].into();
        annotate_favorites(&mut results, &keys);

        assert_eq!(results[0].is_favorite, Some(true));
        assert_eq!(results[1].is_favorite, Some(false));
    }

    #[test]
    fn test_unannotated_results_omit_is_favorite() {
        let result: DupeResult = product("CeraVe", "Hydrating Cleanser").into();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("isFavorite").is_none());
        assert_eq!(
            json.get("productKey").unwrap(),
            "cerave-hydrating-cleanser"
        );
    }

    #[test]
    fn test_degraded_sentiment_shape() {
        let degraded = SentimentResponse::unavailable();
        assert_eq!(degraded.sentiment, "unavailable");
        assert!((degraded.confidence - 0.0).abs() < f64::EPSILON);

        let json = serde_json::to_value(&degraded).unwrap();
        assert_eq!(json.get("sentiment").unwrap(), "unavailable");
        assert_eq!(json.get("confidence").unwrap(), 0.0);
    }

    mod degraded_sentiment_end_to_end {
        use super::*;
        use crate::engine::EngineClient;
        use crate::engine::types::ReviewQuery;
        use crate::config::EngineConfig;

        /// When the engine is unreachable the raw client errors, and the
        /// handler's fallback turns that into the degraded 200 answer.
        #[tokio::test]
        async fn test_unreachable_engine_degrades() {
            let engine = EngineClient::new(&EngineConfig {
                base_url: "http://127.0.0.1:9".to_owned(),
            })
            .unwrap();

            let query = ReviewQuery {
                text: "great product".to_owned(),
                skin_type: "oily".to_owned(),
            };

            let response = match engine.analyze_review(&query).await {
                Ok(analysis) => SentimentResponse {
                    sentiment: analysis.sentiment,
                    confidence: analysis.confidence,
                },
                Err(_) => SentimentResponse::unavailable(),
            };

            assert_eq!(response.sentiment, "unavailable");
            assert!((response.confidence - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_dupe_result_key_matches_favorites_synthesis() {
        // DupeResult carries the synthesized key the favorites store uses,
        // so an authenticated add from a search result dedupes cleanly.
        let result: DupeResult = product("The Ordinary", "Niacinamide 10%").into();
        assert_eq!(result.product_key, "the-ordinary-niacinamide-10");
    }
}
