//! HTTP surface for Kard: the user-record endpoints, password sessions and
//! a gated deck listing.
//!
//! Every route under `/api` except `/api/auth/*`, and anything under
//! `/dashboard`, passes through [`gate::require_session`]. Signed-out callers
//! get a `307` to `/auth`.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use kard_core::{Clock, study::ResumePolicy};
use services::{AppServices, AppServicesError};
use signal::ctrl_c;
use storage::local::InMemoryLocalStore;
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

pub mod config;
pub mod error;
pub mod gate;
pub mod routes;
pub mod state;

pub use config::Config;
use routes::{
    create_session_handler, decks_handler, delete_session_handler, not_found_handler,
    signin_handler, signup_handler,
};
use state::ServerState;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    #[error(transparent)]
    Services(#[from] AppServicesError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/auth/signin", post(signin_handler))
        .route("/api/auth/signup", post(signup_handler))
        .route(
            "/api/auth/session",
            post(create_session_handler).delete(delete_session_handler),
        )
        .route("/api/decks", get(decks_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            gate::require_session,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Connects to the database, binds `0.0.0.0:<port>` and serves until Ctrl+C
/// or SIGTERM.
///
/// # Errors
///
/// Returns `ServerError` if storage cannot be opened or the socket cannot be
/// bound.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    info!("Initializing state...");
    let services = AppServices::new_sqlite(
        &config.db_url,
        Arc::new(InMemoryLocalStore::new()),
        Clock::default_clock(),
        ResumePolicy::default(),
    )
    .await?;
    let app = router(ServerState::new(&services));

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
