use std::sync::Arc;

use kard_core::study::ResumePolicy;
use storage::local::LocalStore;
use storage::repository::Storage;

use crate::Clock;
use crate::app_state::AppStateStore;
use crate::auth_service::AuthService;
use crate::deck_service::DeckService;
use crate::error::AppServicesError;
use crate::user_service::UserService;

/// Assembles app-facing services over one storage backend and one
/// device-local store.
#[derive(Clone)]
pub struct AppServices {
    deck_service: Arc<DeckService>,
    user_service: Arc<UserService>,
    auth_service: Arc<AuthService>,
    app_state: Arc<AppStateStore>,
    local_store: Arc<dyn LocalStore>,
    resume_policy: ResumePolicy,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        local_store: Arc<dyn LocalStore>,
        clock: Clock,
        resume_policy: ResumePolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, local_store, clock, resume_policy))
    }

    /// Build services over in-memory repositories.
    #[must_use]
    pub fn in_memory(local_store: Arc<dyn LocalStore>, clock: Clock) -> Self {
        Self::from_storage(
            &Storage::in_memory(),
            local_store,
            clock,
            ResumePolicy::default(),
        )
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        local_store: Arc<dyn LocalStore>,
        clock: Clock,
        resume_policy: ResumePolicy,
    ) -> Self {
        let deck_service = Arc::new(DeckService::new(
            clock,
            Arc::clone(&storage.decks),
            Arc::clone(&storage.flashcards),
        ));
        let user_service = Arc::new(UserService::new(clock, Arc::clone(&storage.users)));
        let app_state = Arc::new(AppStateStore::load(Arc::clone(&local_store)));
        let auth_service = Arc::new(AuthService::new(
            clock,
            Arc::clone(&storage.auth),
            Arc::clone(&user_service),
            Arc::clone(&app_state),
        ));

        Self {
            deck_service,
            user_service,
            auth_service,
            app_state,
            local_store,
            resume_policy,
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
}
