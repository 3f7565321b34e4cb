//! Account and credential route handlers.
//!
//! Registration and login issue bearer tokens; the remaining endpoints
//! operate on the verified caller. Account deletion removes the user's
//! favorites in the same operation via the schema cascade.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Public view of an account; never carries credential material.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i32(),
            name: user.name,
            email: user.email.into_inner(),
            created_at: user.created_at,
        }
    }
}

/// Issued credential plus the profile it belongs to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub user: UserDto,
}

/// Create an account and issue a bearer token.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let service = AuthService::new(state.pool(), state.tokens());
    let (user, token) = service
        .register(&body.name, &body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Verify a password and issue a bearer token.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let service = AuthService::new(state.pool(), state.tokens());
    let (user, token) = service.login(&body.email, &body.password).await?;

    Ok(Json(TokenResponse {
        token,
        user: user.into(),
    }))
}

/// Return the verified caller's profile.
#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn me(State(state): State<AppState>, auth: RequireAuth) -> Result<Json<UserDto>> {
    let service = AuthService::new(state.pool(), state.tokens());
    let user = service.get_user(auth.0.id).await?;
    Ok(Json(user.into()))
}

/// Update the caller's display name and/or email.
#[instrument(skip(state, auth, body), fields(user_id = %auth.0.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserDto>> {
    let service = AuthService::new(state.pool(), state.tokens());
    let user = service
        .update_profile(auth.0.id, body.name.as_deref(), body.email.as_deref())
        .await?;
    Ok(Json(user.into()))
}

/// Delete the caller's account and, via cascade, their favorites.
#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn delete_account(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<StatusCode> {
    let service = AuthService::new(state.pool(), state.tokens());
    service.delete_account(auth.0.id).await?;

    tracing::info!(user_id = %auth.0.id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
