//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; responses carry a JSON body `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::engine::EngineError;
use crate::services::auth::AuthError;
use crate::services::favorites::FavoritesError;

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Analysis engine operation failed.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Favorites operation failed.
    #[error("Favorites error: {0}")]
    Favorites(#[from] FavoritesError),

    /// Malformed or missing required input, user-correctable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No bearer credential presented, or the header is malformed.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uploaded payload exceeds the scan size limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server-side fault worth capturing.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Engine(e) => matches!(
                e,
                EngineError::Parse(_) | EngineError::Transport(_) | EngineError::Failed { .. }
            ),
            Self::Auth(e) => matches!(
                e,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenSigning
            ),
            Self::Favorites(FavoritesError::Repository(_)) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Engine(err) => match err {
                // Engine rejections reflect bad user input; the engine's
                // own message is surfaced verbatim.
                EngineError::Rejected { .. } => StatusCode::BAD_REQUEST,
                EngineError::Unavailable(_)
                | EngineError::Timeout
                | EngineError::Busy
                | EngineError::Failed { .. } => StatusCode::SERVICE_UNAVAILABLE,
                EngineError::Parse(_) | EngineError::Transport(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::InvalidCredential
                | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Favorites(err) => match err {
                FavoritesError::NotFound => StatusCode::NOT_FOUND,
                FavoritesError::Forbidden => StatusCode::FORBIDDEN,
                FavoritesError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Engine(err) => match err {
                EngineError::Rejected { message, .. } => message.clone(),
                EngineError::Unavailable(_) | EngineError::Failed { .. } => {
                    "The analysis engine is temporarily unavailable".to_string()
                }
                EngineError::Timeout => "The analysis engine took too long to respond".to_string(),
                EngineError::Busy => "The analysis engine is busy, please retry".to_string(),
                EngineError::Parse(_) | EngineError::Transport(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::InvalidCredential | AuthError::UserNotFound => {
                    "Invalid or expired credential".to_string()
                }
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) | AuthError::InvalidName(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => e.to_string(),
                _ => "Internal server error".to_string(),
            },
            Self::Favorites(err) => match err {
                FavoritesError::NotFound => "Favorite not found".to_string(),
                FavoritesError::Forbidden => {
                    "This favorite belongs to another account".to_string()
                }
                FavoritesError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Validation(msg) => msg.clone(),
            Self::Unauthenticated(msg) => msg.clone(),
            Self::NotFound(msg) => format!("Not found: {msg}"),
            Self::PayloadTooLarge => "Image exceeds the 10 MiB scan limit".to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("favorite".to_string());
        assert_eq!(err.to_string(), "Not found: favorite");

        let err = AppError::Validation("ingredients too short".to_string());
        assert_eq!(err.to_string(), "Validation error: ingredients too short");
    }

    #[test]
    fn test_basic_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("no token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::PayloadTooLarge),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_engine_error_status_codes() {
        assert_eq!(
            get_status(AppError::Engine(EngineError::Timeout)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Engine(EngineError::Busy)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Engine(EngineError::Unavailable(
                "refused".to_string()
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        // Rejections are the user's problem, not an outage
        assert_eq!(
            get_status(AppError::Engine(EngineError::Rejected {
                status: 422,
                message: "ingredients required".to_string(),
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_ownership_and_absence_are_distinct() {
        assert_eq!(
            get_status(AppError::Favorites(FavoritesError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Favorites(FavoritesError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredential)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::WeakPassword("weak".to_string()))),
            StatusCode::BAD_REQUEST
        );
    }
}
