//! Session lookup and route gating for `/api/*` and `/dashboard/*`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use kard_core::access::{Gate, gate};

use crate::state::ServerState;

pub const SESSION_COOKIE: &str = "kard-session";

fn is_guarded(path: &str) -> bool {
    let under = |prefix: &str| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    };
    (under("/api") && !under("/api/auth")) || under("/dashboard")
}

/// Token from `Authorization: Bearer …`, else from the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// Resolves the caller's session and applies [`gate`]. Allowed requests carry
/// the session as a request extension.
pub async fn require_session(
    State(state): State<Arc<ServerState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if !is_guarded(&path) {
        return next.run(req).await;
    }

    let session = match session_token(req.headers()) {
        Some(token) => state
            .auth
            .resolve(&token)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "session lookup failed"))
            .ok()
            .flatten(),
        None => None,
    };

    match gate(&path, session.is_some()) {
        Gate::Redirect(to) => {
            tracing::debug!(%path, to, "redirecting request");
            Redirect::temporary(to).into_response()
        }
        Gate::Allow => {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
    }
}
