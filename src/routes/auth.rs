//! Auth routes: sign-up, sign-in, bearer sessions.

use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use super::body::LenientJson;
use super::error::ApiError;
use crate::services::auth::{self as auth_svc, User};
use crate::services::session;
use crate::state::AppState;

pub const MISSING_TOKEN: &str = "Missing Bearer token";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the `Authorization: Bearer` header.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Token carried by the request headers, if any.
pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(session::parse_bearer)
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| ApiError::Unauthorized(MISSING_TOKEN.to_owned()))?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(INVALID_TOKEN.to_owned()))?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SignUpBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /api/auth/signup`: create an account.
pub async fn signup(State(state): State<AppState>, LenientJson(body): LenientJson<SignUpBody>) -> Result<Response, ApiError> {
    let signup = auth_svc::validate_signup(body.name.as_deref(), body.email.as_deref(), body.password.as_deref())?;
    let user = auth_svc::create_user(&state.pool, &signup).await?;
    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "User created", "user": user })),
    )
        .into_response())
}

/// `POST /api/auth/signin`: check credentials and issue a bearer token.
pub async fn signin(
    State(state): State<AppState>,
    LenientJson(body): LenientJson<SignInBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (email, password) = auth_svc::validate_signin(body.email.as_deref(), body.password.as_deref())?;
    let user = auth_svc::verify_credentials(&state.pool, &email, &password).await?;

    let purged = session::purge_expired(&state.pool, user.id).await?;
    let token = session::create_session(&state.pool, user.id, state.config.session_ttl_secs).await?;
    tracing::info!(user_id = %user.id, purged, "user signed in");

    Ok(Json(json!({ "success": true, "message": "Signed in", "user_token": token, "user": user })))
}

/// `GET /api/auth/me`: return the current user.
pub async fn me(auth: AuthUser) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "user": auth.user }))
}

/// `POST /api/auth/logout`: revoke the bearer token.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<Json<serde_json::Value>, ApiError> {
    session::delete_session(&state.pool, &auth.token).await?;
    tracing::info!(user_id = %auth.user.id, "user logged out");
    Ok(Json(json!({ "success": true, "message": "Logged out" })))
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub email: Option<String>,
}

/// `GET /api/auth/users[?email=]`: list accounts, or look one up by email.
pub async fn users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<UsersQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match query.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => {
            let user = auth_svc::find_user_by_email(&state.pool, email)
                .await?
                .ok_or(auth_svc::AuthError::UserNotFound)?;
            Ok(Json(json!({ "success": true, "user": user })))
        }
        None => {
            let users = auth_svc::list_users(&state.pool).await?;
            Ok(Json(json!({ "success": true, "users": users })))
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
