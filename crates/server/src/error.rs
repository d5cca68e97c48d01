use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler reports. The message is the whole response body,
/// so backend details stay in the logs.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("Failed to update user")]
    UpdateUser,

    #[error("Failed to create user")]
    CreateUser,

    #[error("Failed to load decks")]
    LoadDecks,

    #[error("Failed to sign in")]
    SignIn,

    #[error("Failed to sign out")]
    SignOut,

    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
