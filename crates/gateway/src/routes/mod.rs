//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (database connectivity)
//!
//! # Auth
//! POST   /auth/register          - Create account, issue bearer token
//! POST   /auth/login             - Issue bearer token
//! GET    /auth/me                - Current profile (auth)
//! PUT    /auth/profile           - Update profile (auth)
//! DELETE /auth/account           - Delete account + favorites (auth)
//!
//! # Analysis proxy
//! POST   /analysis/dupes         - Duplicate search (optional auth for isFavorite)
//! POST   /analysis/sentiment     - Review sentiment (degrades, never 5xx on engine loss)
//! POST   /analysis/scan          - Image scan (multipart "file", <= 10 MiB)
//! POST   /analysis/quality       - Product quality report
//! POST   /analysis/recommend     - Recommendations for a skin type
//! GET    /analysis/filters       - Category/brand/type catalog (cached)
//!
//! # Favorites (auth)
//! POST   /favorites              - Add favorite (200 + alreadyExists flag on duplicate)
//! GET    /favorites              - List favorites, newest first
//! DELETE /favorites/{id}         - Remove favorite (403 on foreign, 404 on absent)
//! ```

pub mod analysis;
pub mod auth;
pub mod favorites;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::middleware::rate_limit::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Body limit for the analysis router: the 10 MiB scan payload plus
/// multipart framing overhead. The handler enforces the exact 10 MiB
/// boundary itself so the client gets the precise error.
const ANALYSIS_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    // Credential endpoints get the strict limiter (brute-force surface)
    let credential_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(credential_routes)
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile))
        .route("/account", delete(auth::delete_account))
}

/// Create the analysis proxy routes router.
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/dupes", post(analysis::dupes))
        .route("/sentiment", post(analysis::sentiment))
        .route("/scan", post(analysis::scan))
        .route("/quality", post(analysis::quality))
        .route("/recommend", post(analysis::recommend))
        .route("/filters", get(analysis::filters))
        .layer(DefaultBodyLimit::max(ANALYSIS_BODY_LIMIT))
        .layer(api_rate_limiter())
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(favorites::add).get(favorites::list))
        .route("/{id}", delete(favorites::remove))
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/analysis", analysis_routes())
        .nest("/favorites", favorite_routes())
}
