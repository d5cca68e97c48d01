use dioxus::prelude::*;
use dioxus_router::Link;
use services::AppState;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{DeckCardVm, map_deck_cards};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_context::<Signal<AppState>>();
    let mut query = use_signal(String::new);

    let resource = use_resource(move || {
        let deck_service = ctx.deck_service();
        let owner = state.read().session.as_ref().map(|s| s.user_id);
        let query = query();
        async move {
            let owner = owner.ok_or(ViewError::SignedOut)?;
            let decks = deck_service
                .search_decks(owner, &query)
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok::<_, ViewError>(map_deck_cards(&decks))
        }
    });
    let decks = view_state_from_resource(&resource);

    let session = state.read().session.clone();
    let Some(session) = session else {
        return rsx! {
            div { class: "page home-page",
                h2 { "Welcome to Kard!" }
                p { "Create decks, add flashcards and study them one card at a time." }
                Link { to: Route::Auth {}, class: "btn btn-primary", "Sign in to get started" }
            }
        };
    };

    rsx! {
        div { class: "page home-page",
            header { class: "home-page__greeting",
                h2 { "Welcome back, {session.display_name()}!" }
                p { "Let's keep studying" }
            }
            input {
                class: "search",
                r#type: "search",
                placeholder: "Search your decks",
                value: "{query}",
                oninput: move |evt| query.set(evt.value()),
            }
            h3 { "Your Decks" }
            match decks {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "alert alert--error", "{err.message()}" }
                },
                ViewState::Ready(decks) if decks.is_empty() && query().trim().is_empty() => rsx! {
                    div { class: "empty-state",
                        p { "No decks yet" }
                        Link { to: Route::Create {}, "Start creating your first flashcard deck" }
                    }
                },
                ViewState::Ready(decks) if decks.is_empty() => rsx! {
                    p { class: "empty-state", "No decks match \"{query}\"" }
                },
                ViewState::Ready(decks) => rsx! {
                    div { class: "deck-grid",
                        for deck in decks {
                            DeckTile { key: "{deck.id}", deck }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn DeckTile(deck: DeckCardVm) -> Element {
    rsx! {
        Link { to: Route::Study { deck_id: deck.id }, class: "deck-tile",
            h4 { "{deck.name}" }
            if let Some(description) = deck.description.as_ref() {
                p { class: "deck-tile__description", "{description}" }
            }
            span { class: "deck-tile__count", "{deck.card_count_label}" }
            span { class: "deck-tile__date", "{deck.created_label}" }
        }
    }
}
