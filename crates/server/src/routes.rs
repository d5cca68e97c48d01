use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use kard_core::model::{AuthSession, Deck, UserId, UserRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::{error::ApiError, gate::session_token, state::ServerState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInPayload {
    user_id: UserId,
}

#[derive(Deserialize)]
pub struct SignUpPayload {
    id: UserId,
    email: String,
}

#[derive(Deserialize)]
pub struct CredentialsPayload {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    user: UserRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    token: String,
    user_id: UserId,
}

/// `POST /api/auth/signin`: stamps the user's last login.
pub async fn signin_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SignInPayload>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Malformed signin payload: {e}");
        ApiError::UpdateUser
    })?;

    let user = state
        .users
        .record_sign_in(payload.user_id)
        .await
        .map_err(|_| ApiError::UpdateUser)?;
    Ok(Json(UserResponse { user }))
}

/// `POST /api/auth/signup`: mirrors a new account with an empty profile.
pub async fn signup_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SignUpPayload>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Malformed signup payload: {e}");
        ApiError::CreateUser
    })?;

    let user = state
        .users
        .mirror_sign_up(payload.id, &payload.email)
        .await
        .map_err(|_| ApiError::CreateUser)?;
    Ok(Json(UserResponse { user }))
}

pub async fn create_session_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Malformed session payload: {e}");
        ApiError::SignIn
    })?;

    let session = state
        .auth
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            if e.is_rejection() {
                ApiError::Unauthorized(e.to_string())
            } else {
                ApiError::SignIn
            }
        })?;
    Ok(Json(SessionResponse {
        token: session.token,
        user_id: session.user_id,
    }))
}

pub async fn delete_session_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("missing session token".to_string()))?;
    state
        .auth
        .revoke(&token)
        .await
        .map_err(|_| ApiError::SignOut)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/decks`: the caller's decks with their cards, newest first.
pub async fn decks_handler(
    State(state): State<Arc<ServerState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Vec<Deck>>, ApiError> {
    let decks = state
        .decks
        .list_decks(session.user_id)
        .await
        .map_err(|_| ApiError::LoadDecks)?;
    Ok(Json(decks))
}

pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
