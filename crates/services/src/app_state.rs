use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use kard_core::model::AuthSession;
use storage::local::LocalStore;
use tokio::sync::watch;

pub const SIDEBAR_OPEN_KEY: &str = "kard-sidebar-open";
pub const ACTIVE_VIEW_KEY: &str = "kard-active-view";
pub const AUTH_TOKEN_KEY: &str = "kard-auth-token";

/// Section of the signed-in dashboard currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardView {
    #[default]
    Home,
    Decks,
    Create,
    Profile,
}

impl DashboardView {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Decks => "decks",
            Self::Create => "create",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "decks" => Ok(Self::Decks),
            "create" => Ok(Self::Create),
            "profile" => Ok(Self::Profile),
            other => Err(format!("unknown dashboard view `{other}`")),
        }
    }
}

/// Process-wide UI state shared by every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub session: Option<AuthSession>,
    pub sidebar_open: bool,
    pub active_view: DashboardView,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: None,
            sidebar_open: true,
            active_view: DashboardView::Home,
        }
    }
}

/// Holds [`AppState`], mirrors the layout fields to the local store and
/// notifies subscribers on every change.
///
/// Subscribers drop their receiver to unsubscribe.
pub struct AppStateStore {
    store: Arc<dyn LocalStore>,
    state: watch::Sender<AppState>,
}

impl AppStateStore {
    /// Loads persisted layout fields. Unreadable values fall back to defaults.
    #[must_use]
    pub fn load(store: Arc<dyn LocalStore>) -> Self {
        let mut state = AppState::default();

        match store.get(SIDEBAR_OPEN_KEY) {
            Ok(Some(raw)) => match raw.as_str() {
                "true" => state.sidebar_open = true,
                "false" => state.sidebar_open = false,
                other => tracing::warn!(value = other, "ignoring invalid sidebar state"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to read sidebar state"),
        }

        match store.get(ACTIVE_VIEW_KEY) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(view) => state.active_view = view,
                Err(e) => tracing::warn!(error = %e, "ignoring invalid active view"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to read active view"),
        }

        let (state, _) = watch::channel(state);
        Self { store, state }
    }

    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.state.borrow().session.clone()
    }

    /// Token saved by the last sign-in on this device, if any.
    #[must_use]
    pub fn remembered_token(&self) -> Option<String> {
        self.store
            .get(AUTH_TOKEN_KEY)
            .inspect_err(|e| tracing::warn!(error = %e, "failed to read auth token"))
            .ok()
            .flatten()
    }

    pub fn set_session(&self, session: Option<AuthSession>) {
        let write = match &session {
            Some(s) => self.store.set(AUTH_TOKEN_KEY, &s.token),
            None => self.store.remove(AUTH_TOKEN_KEY),
        };
        if let Err(e) = write {
            tracing::warn!(error = %e, "failed to persist auth token");
        }
        self.state.send_modify(|state| state.session = session);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.persist(SIDEBAR_OPEN_KEY, if open { "true" } else { "false" });
        self.state.send_modify(|state| state.sidebar_open = open);
    }

    /// Flips the sidebar and returns the new value.
    pub fn toggle_sidebar(&self) -> bool {
        let open = !self.state.borrow().sidebar_open;
        self.set_sidebar_open(open);
        open
    }

    pub fn set_active_view(&self, view: DashboardView) {
        self.persist(ACTIVE_VIEW_KEY, view.as_str());
        self.state.send_modify(|state| state.active_view = view);
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "failed to persist app state");
        }
    }
}
