use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use kard_core::model::{AuthSession, Deck, DeckId, FlashcardDraft};
use kard_core::time::fixed_now;
use services::{AppServices, Clock};
use storage::local::InMemoryLocalStore;

use crate::app::use_app_state_provider;
use crate::context::{UiApp, build_app_context};
use crate::views::{AuthView, CreateView, DecksView, HomeView, ProfileView, StudyView};

pub const TEST_EMAIL: &str = "ana@example.com";
const TEST_PASSWORD: &str = "Secret123!";

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Auth,
    Decks,
    Create,
    Study(DeckId),
    Profile,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<AppServices>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    use_app_state_provider();
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Auth => rsx! { AuthView {} },
        ViewKind::Decks => rsx! { DecksView {} },
        ViewKind::Create => rsx! { CreateView {} },
        ViewKind::Study(deck_id) => rsx! { StudyView { deck_id } },
        ViewKind::Profile => rsx! { ProfileView {} },
    }
}

/// Services over in-memory storage, optionally with a signed-in user.
pub struct Fixture {
    pub services: AppServices,
    pub local: InMemoryLocalStore,
    pub session: Option<AuthSession>,
}

impl Fixture {
    pub fn signed_out() -> Self {
        let local = InMemoryLocalStore::new();
        let services = AppServices::in_memory(Arc::new(local.clone()), Clock::fixed(fixed_now()));
        Self {
            services,
            local,
            session: None,
        }
    }

    pub async fn signed_in() -> Self {
        let mut fixture = Self::signed_out();
        let auth = fixture.services.auth_service();
        auth.sign_up(TEST_EMAIL, TEST_PASSWORD, TEST_PASSWORD)
            .await
            .expect("sign up");
        fixture.session = Some(auth.sign_in(TEST_EMAIL, TEST_PASSWORD).await.expect("sign in"));
        fixture
    }

    pub async fn seed_deck(&self, name: &str, cards: &[(&str, &str)]) -> Deck {
        let owner = self.session.as_ref().expect("signed in").user_id;
        let decks = self.services.deck_service();
        let deck = decks.create_deck(owner, name, None).await.expect("create deck");
        if !cards.is_empty() {
            let drafts: Vec<_> = cards
                .iter()
                .map(|(front, back)| FlashcardDraft::new(*front, *back))
                .collect();
            decks
                .create_flashcards(owner, deck.id(), &drafts)
                .await
                .expect("create flashcards");
        }
        decks
            .get_deck(owner, deck.id())
            .await
            .expect("get deck")
            .expect("deck exists")
    }

    pub fn mount(&self, view: ViewKind) -> ViewHarness {
        let dom = VirtualDom::new_with_props(
            ViewRouterHarness,
            ViewHarnessProps {
                app: Arc::new(self.services.clone()),
                view,
            },
        );
        ViewHarness { dom }
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Builds the tree and lets pending resources resolve.
    pub async fn settle(&mut self) -> String {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}
