#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_state;
pub mod auth_service;
pub mod credentials;
pub mod deck_service;
pub mod error;
pub mod study_controller;
pub mod user_service;

pub use kard_core::Clock;

pub use app_services::AppServices;
pub use app_state::{AppState, AppStateStore, DashboardView};
pub use auth_service::AuthService;
pub use deck_service::DeckService;
pub use error::{AppServicesError, AuthError, DeckServiceError, UserServiceError};
pub use study_controller::{StudyController, StudyOutcome};
pub use user_service::UserService;
