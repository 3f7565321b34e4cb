//! Authentication extractors.
//!
//! Provides extractors for requiring (or optionally reading) a verified
//! bearer identity in route handlers. Verification runs to completion
//! before the handler body executes; protected handlers never start with
//! an unverified caller.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::models::user::AuthUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a verified bearer identity.
///
/// Rejects with 401 when the `Authorization` header is missing or
/// malformed (`Unauthenticated`) and when the token fails verification or
/// its account no longer exists (`InvalidCredential`).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthenticated("Missing bearer credential".to_owned()))?;

        let user = AuthService::new(state.pool(), state.tokens())
            .verify(token)
            .await?;

        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the current identity.
///
/// Unlike `RequireAuth`, this does not reject the request when no valid
/// credential is presented; an invalid token simply yields `None`. Used
/// by endpoints whose behavior is enriched — not gated — by identity.
pub struct OptionalAuth(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match bearer_token(parts) {
            Some(token) => AuthService::new(state.pool(), state.tokens())
                .verify(token)
                .await
                .ok(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Pull the bearer token out of the `Authorization` header.
///
/// Returns `None` for a missing header, a non-Bearer scheme, or an empty
/// token.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/favorites");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_is_none() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_wrong_scheme_is_none() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_empty_token_is_none() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
        let parts = parts_with_auth(Some("Bearer    "));
        assert_eq!(bearer_token(&parts), None);
    }
}
