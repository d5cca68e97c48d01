use std::sync::Arc;

use services::{AppServices, AuthService, DeckService, UserService};

/// Shared handler state.
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub decks: Arc<DeckService>,
}

impl ServerState {
    #[must_use]
    pub fn new(services: &AppServices) -> Arc<Self> {
        Arc::new(Self {
            auth: services.auth_service(),
            users: services.user_service(),
            decks: services.deck_service(),
        })
    }
}
