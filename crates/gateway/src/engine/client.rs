//! HTTP client for the analysis engine.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{
    DupeQuery, DupeSearchOutcome, FilterCatalog, QualityQuery, RecommendQuery, Recommendations,
    ReviewAnalysis, ReviewQuery, ScanOutcome,
};
use super::{EngineError, classify_status};
use crate::config::EngineConfig;

/// Fixed deadline for every engine call. When it fires the client drops
/// the connection and the caller sees [`EngineError::Timeout`]; the
/// gateway never retries on its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TTL for the cached filter catalog.
const FILTERS_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Client for the PureSkin analysis engine.
///
/// Cheaply cloneable; the filter catalog is cached for 5 minutes.
#[derive(Clone)]
pub struct EngineClient {
    inner: Arc<EngineClientInner>,
}

struct EngineClientInner {
    client: reqwest::Client,
    base_url: String,
    filters_cache: Cache<(), FilterCatalog>,
}

impl EngineClient {
    /// Create a new engine client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let filters_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(FILTERS_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(EngineClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                filters_cache,
            }),
        })
    }

    /// Find cheaper products with similar ingredient profiles.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`EngineError`] on any upstream failure.
    #[instrument(skip(self, query), fields(target_price = query.target_price))]
    pub async fn find_dupes(&self, query: &DupeQuery) -> Result<DupeSearchOutcome, EngineError> {
        self.post_json("/analyze/find_dupes", query).await
    }

    /// Analyze review/sentiment text.
    ///
    /// This is the raw call; the degraded-but-successful fallback for
    /// unreachable engines belongs to the route layer, since sentiment is
    /// advisory there but a real failure here.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`EngineError`] on any upstream failure.
    #[instrument(skip(self, query))]
    pub async fn analyze_review(&self, query: &ReviewQuery) -> Result<ReviewAnalysis, EngineError> {
        self.post_json("/analyze/review", query).await
    }

    /// Submit a product photo for OCR + scan analysis.
    ///
    /// The payload is forwarded unmodified as the multipart field `file`.
    /// Size limits are enforced by the caller before this method runs.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`EngineError`] on any upstream failure.
    #[instrument(skip(self, payload), fields(bytes = payload.len(), file_name = %file_name))]
    pub async fn scan_image(
        &self,
        payload: Vec<u8>,
        file_name: String,
        content_type: Option<String>,
    ) -> Result<ScanOutcome, EngineError> {
        let mut part = reqwest::multipart::Part::bytes(payload).file_name(file_name);
        if let Some(content_type) = content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| EngineError::Transport(format!("invalid content type: {e}")))?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .inner
            .client
            .post(self.url("/analyze/scan"))
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Run a full quality analysis for a named product.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`EngineError`] on any upstream failure.
    #[instrument(skip(self, query), fields(product_name = %query.product_name))]
    pub async fn analyze_quality(
        &self,
        query: &QualityQuery,
    ) -> Result<serde_json::Value, EngineError> {
        self.post_json("/analyze/quality", query).await
    }

    /// Fetch product recommendations for a skin type.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`EngineError`] on any upstream failure.
    #[instrument(skip(self, query), fields(skin_type = %query.skin_type))]
    pub async fn recommend(&self, query: &RecommendQuery) -> Result<Recommendations, EngineError> {
        self.post_json("/analyze/recommend", query).await
    }

    /// Fetch the engine's category/brand/type catalog, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`EngineError`] on any upstream failure.
    #[instrument(skip(self))]
    pub async fn filters(&self) -> Result<FilterCatalog, EngineError> {
        if let Some(catalog) = self.inner.filters_cache.get(&()).await {
            debug!("filter catalog served from cache");
            return Ok(catalog);
        }

        let catalog: FilterCatalog = self.get_json("/analyze/filters").await?;
        self.inner.filters_cache.insert((), catalog.clone()).await;
        Ok(catalog)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// GET and decode a JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, EngineError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    /// Turn an upstream response into a decoded value or a normalized error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, EngineError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = %status, "engine returned non-success status");
            return Err(classify_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            EngineError::Parse(format!(
                "{e} (body: {})",
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A client aimed at a port nothing listens on; connections are
    /// refused immediately.
    fn unreachable_client() -> EngineClient {
        EngineClient::new(&EngineConfig {
            base_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = EngineClient::new(&EngineConfig {
            base_url: "http://engine:8000/".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.url("/analyze/find_dupes"),
            "http://engine:8000/analyze/find_dupes"
        );
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_unavailable() {
        let client = unreachable_client();
        let query = ReviewQuery {
            text: "great product".to_owned(),
            skin_type: "All".to_owned(),
        };

        let err = client.analyze_review(&query).await.unwrap_err();
        assert!(
            matches!(err, EngineError::Unavailable(_)),
            "expected Unavailable, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_unreachable_engine_scan_is_unavailable() {
        let client = unreachable_client();
        let err = client
            .scan_image(vec![0xFF, 0xD8], "photo.jpg".to_owned(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }
}
