//! Wire types for the analysis engine.
//!
//! These mirror the engine's own snake_case JSON; the gateway's
//! client-facing camelCase DTOs live with the routes. Response shapes are
//! deliberately tolerant (`#[serde(default)]`, unknown fields ignored) —
//! the engine is a moving target the gateway treats as a black box.

use serde::{Deserialize, Serialize};

/// Request body for `POST /analyze/find_dupes`.
#[derive(Debug, Clone, Serialize)]
pub struct DupeQuery {
    pub ingredients: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub target_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_category: Option<String>,
    pub top_n: u32,
}

/// One product as reported by the engine.
///
/// `price_usd` appears on some engine paths where `price` appears on
/// others; both land in `price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineProduct {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default, alias = "price_usd")]
    pub price: Option<f64>,
    #[serde(default, alias = "similarity_score")]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub primary_category: Option<String>,
    #[serde(default)]
    pub secondary_category: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub savings_amount: Option<f64>,
    #[serde(default)]
    pub is_economic_dupe: Option<bool>,
}

/// Response body for `POST /analyze/find_dupes`.
#[derive(Debug, Clone, Deserialize)]
pub struct DupeSearchOutcome {
    #[serde(default)]
    pub found_cheaper_dupe: bool,
    #[serde(default)]
    pub best_dupe: Option<EngineProduct>,
    #[serde(default)]
    pub alternatives: Vec<EngineProduct>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DupeSearchOutcome {
    /// Flatten the engine's best/alternatives split into one result list.
    ///
    /// When the engine found a cheaper dupe, `best_dupe` is the head of
    /// `alternatives`; when it found nothing, only `alternatives` (the raw
    /// candidates) is populated. Either way the list is the answer.
    #[must_use]
    pub fn into_results(self) -> Vec<EngineProduct> {
        if self.alternatives.is_empty() {
            self.best_dupe.into_iter().collect()
        } else {
            self.alternatives
        }
    }
}

/// Request body for `POST /analyze/review`.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewQuery {
    pub text: String,
    pub skin_type: String,
}

/// Response body for `POST /analyze/review`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewAnalysis {
    #[serde(default = "default_sentiment")]
    pub sentiment: String,
    #[serde(default)]
    pub confidence: f64,
}

fn default_sentiment() -> String {
    "neutral".to_owned()
}

/// Response body for `POST /analyze/scan`.
///
/// The OCR/analysis payloads are passed through untyped; the gateway does
/// not interpret them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_matches: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
}

/// Request body for `POST /analyze/quality`.
///
/// The engine expects the optional fields as empty strings, not nulls.
#[derive(Debug, Clone, Serialize)]
pub struct QualityQuery {
    pub product_name: String,
    pub brand_name: String,
    pub ingredients: String,
}

/// Request body for `POST /analyze/recommend`.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendQuery {
    pub skin_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Response body for `POST /analyze/recommend`.
#[derive(Debug, Clone, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub recommendations: Vec<EngineProduct>,
}

/// Response body for `GET /analyze/filters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCatalog {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dupe_outcome_with_cheaper_dupe() {
        let body = r#"{
            "found_cheaper_dupe": true,
            "best_dupe": {
                "product_name": "Hydro Boost",
                "brand_name": "Neutrogena",
                "price": 18.99,
                "similarity": 0.91,
                "savings_amount": 21.01,
                "is_economic_dupe": true
            },
            "alternatives": [
                {"product_name": "Hydro Boost", "brand_name": "Neutrogena", "price": 18.99, "similarity": 0.91},
                {"product_name": "Hydrating Gel", "brand_name": "CeraVe", "price": 15.5, "similarity": 0.84}
            ]
        }"#;

        let outcome: DupeSearchOutcome = serde_json::from_str(body).unwrap();
        assert!(outcome.found_cheaper_dupe);
        let results = outcome.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results.first().unwrap().brand_name, "Neutrogena");
    }

    #[test]
    fn test_dupe_outcome_without_match_uses_best_dupe_fallback() {
        let body = r#"{
            "found_cheaper_dupe": false,
            "message": "Aucun dupe significativement moins cher trouvé.",
            "best_dupe": {"product_name": "Only Hit", "brand_name": "Brand"},
            "alternatives": []
        }"#;

        let outcome: DupeSearchOutcome = serde_json::from_str(body).unwrap();
        let results = outcome.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results.first().unwrap().product_name, "Only Hit");
    }

    #[test]
    fn test_engine_product_accepts_price_usd_alias() {
        let body = r#"{"product_name": "Serum", "brand_name": "B", "price_usd": 12.5,
                       "similarity_score": 0.7}"#;
        let product: EngineProduct = serde_json::from_str(body).unwrap();
        assert_eq!(product.price, Some(12.5));
        assert_eq!(product.similarity, Some(0.7));
    }

    #[test]
    fn test_review_analysis_defaults() {
        let analysis: ReviewAnalysis = serde_json::from_str("{}").unwrap();
        assert_eq!(analysis.sentiment, "neutral");
        assert!((analysis.confidence - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scan_outcome_error_shape() {
        let body = r#"{"success": false, "error": "Erreur OCR"}"#;
        let outcome: ScanOutcome = serde_json::from_str(body).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Erreur OCR"));
        assert!(outcome.analysis.is_none());
    }

    #[test]
    fn test_filter_catalog_tolerates_missing_fields() {
        let catalog: FilterCatalog = serde_json::from_str(r#"{"categories": ["Skincare"]}"#).unwrap();
        assert_eq!(catalog.categories, vec!["Skincare"]);
        assert!(catalog.brands.is_empty());
        assert!(catalog.types.is_empty());
    }

    #[test]
    fn test_dupe_query_omits_empty_filters() {
        let query = DupeQuery {
            ingredients: "aqua, glycerin".to_owned(),
            brand: None,
            target_price: 0.0,
            primary_category: None,
            secondary_category: None,
            top_n: 20,
        };
        let json = serde_json::to_value(&query).unwrap();
        assert!(json.get("brand").is_none());
        assert!(json.get("primary_category").is_none());
        assert_eq!(json.get("top_n").unwrap(), 20);
    }
}
