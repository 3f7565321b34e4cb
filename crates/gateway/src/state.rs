//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::GatewayConfig;
use crate::engine::{EngineClient, EngineError};
use crate::services::auth::TokenSigner;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the engine client, and the
/// token signer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    pool: PgPool,
    engine: EngineClient,
    tokens: TokenSigner,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine HTTP client cannot be built.
    pub fn new(config: GatewayConfig, pool: PgPool) -> Result<Self, EngineError> {
        let engine = EngineClient::new(&config.engine)?;
        let tokens = TokenSigner::new(&config.token_secret);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                engine,
                tokens,
            }),
        })
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the analysis engine client.
    #[must_use]
    pub fn engine(&self) -> &EngineClient {
        &self.inner.engine
    }

    /// Get a reference to the bearer-token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }
}
