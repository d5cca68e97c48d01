use std::sync::Arc;

use kard_core::model::UserId;
use kard_core::study::ResumePolicy;
use services::{AppServices, AppStateStore, AuthService, DeckService, UserService};
use storage::local::LocalStore;

pub trait UiApp: Send + Sync {
    fn deck_service(&self) -> Arc<DeckService>;
    fn user_service(&self) -> Arc<UserService>;
    fn auth_service(&self) -> Arc<AuthService>;
    fn app_state(&self) -> Arc<AppStateStore>;
    fn local_store(&self) -> Arc<dyn LocalStore>;
    fn resume_policy(&self) -> ResumePolicy;
}

impl UiApp for AppServices {
    fn deck_service(&self) -> Arc<DeckService> {
        AppServices::deck_service(self)
    }

    fn user_service(&self) -> Arc<UserService> {
        AppServices::user_service(self)
    }

    fn auth_service(&self) -> Arc<AuthService> {
        AppServices::auth_service(self)
    }

    fn app_state(&self) -> Arc<AppStateStore> {
        AppServices::app_state(self)
    }

    fn local_store(&self) -> Arc<dyn LocalStore> {
        AppServices::local_store(self)
    }

    fn resume_policy(&self) -> ResumePolicy {
        AppServices::resume_policy(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    deck_service: Arc<DeckService>,
    user_service: Arc<UserService>,
    auth_service: Arc<AuthService>,
    app_state: Arc<AppStateStore>,
    local_store: Arc<dyn LocalStore>,
    resume_policy: ResumePolicy,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            deck_service: app.deck_service(),
            user_service: app.user_service(),
            auth_service: app.auth_service(),
            app_state: app.app_state(),
            local_store: app.local_store(),
            resume_policy: app.resume_policy(),
        }
    }

    #[must_use]
    pub fn deck_service(&self) -> Arc<DeckService> {
        Arc::clone(&self.deck_service)
    }

    #[must_use]
    pub fn user_service(&self) -> Arc<UserService> {
        Arc::clone(&self.user_service)
    }

    #[must_use]
    pub fn auth_service(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth_service)
    }

    #[must_use]
    pub fn app_state(&self) -> Arc<AppStateStore> {
        Arc::clone(&self.app_state)
    }

    #[must_use]
    pub fn local_store(&self) -> Arc<dyn LocalStore> {
        Arc::clone(&self.local_store)
    }

    #[must_use]
    pub fn resume_policy(&self) -> ResumePolicy {
        self.resume_policy
    }

    /// Id of the signed-in user, read straight from the state store.
    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.app_state.session().map(|session| session.user_id)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
