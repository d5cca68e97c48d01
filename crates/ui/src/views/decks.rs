use dioxus::prelude::*;
use dioxus_router::Link;
use kard_core::model::{Deck, DeckId};
use services::AppState;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{card_count_label, format_date};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeleteStep {
    Idle,
    Confirming,
    Deleting,
}

#[component]
pub fn DecksView() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_context::<Signal<AppState>>();
    let mut selected = use_signal(|| None::<DeckId>);

    let mut resource = use_resource(move || {
        let deck_service = ctx.deck_service();
        let owner = state.read().session.as_ref().map(|s| s.user_id);
        async move {
            let owner = owner.ok_or(ViewError::SignedOut)?;
            deck_service
                .list_decks(owner)
                .await
                .map_err(|_| ViewError::Unknown)
        }
    });
    let decks = view_state_from_resource(&resource);

    rsx! {
        div { class: "page decks-page",
            h2 { "Your Decks" }
            match decks {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "alert alert--error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
                ViewState::Ready(decks) if decks.is_empty() => rsx! {
                    div { class: "empty-state",
                        p { "No decks yet" }
                        p { "Create your first deck to get started with flashcards" }
                        Link { to: Route::Create {}, class: "btn btn-primary", "Create a deck" }
                    }
                },
                ViewState::Ready(decks) => {
                    let open = selected().and_then(|id| decks.iter().find(|d| d.id() == id).cloned());
                    match open {
                        Some(deck) => rsx! {
                            DeckDetails {
                                deck,
                                on_back: move |()| selected.set(None),
                                on_deleted: move |()| {
                                    selected.set(None);
                                    resource.restart();
                                },
                            }
                        },
                        None => rsx! {
                            div { class: "deck-grid",
                                for deck in decks {
                                    button {
                                        key: "{deck.id()}",
                                        class: "deck-tile",
                                        r#type: "button",
                                        onclick: {
                                            let id = deck.id();
                                            move |_| selected.set(Some(id))
                                        },
                                        h4 { "{deck.name()}" }
                                        if let Some(description) = deck.description() {
                                            p { class: "deck-tile__description", "{description}" }
                                        }
                                        span { class: "deck-tile__count", "{card_count_label(deck.card_count())}" }
                                        span { class: "deck-tile__date", "Created {format_date(deck.created_at())}" }
                                    }
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}

#[derive(Props, Clone)]
struct DeckDetailsProps {
    deck: Deck,
    on_back: EventHandler<()>,
    on_deleted: EventHandler<()>,
}

impl PartialEq for DeckDetailsProps {
    fn eq(&self, other: &Self) -> bool {
        self.deck == other.deck
    }
}

#[component]
fn DeckDetails(props: DeckDetailsProps) -> Element {
    let ctx = use_context::<AppContext>();
    let mut step = use_signal(|| DeleteStep::Idle);
    let mut error = use_signal(|| None::<ViewError>);
    let deck = props.deck;
    let deck_id = deck.id();
    let on_deleted = props.on_deleted;

    let delete = move |_: MouseEvent| {
        let Some(owner) = ctx.current_user() else {
            error.set(Some(ViewError::SignedOut));
            return;
        };
        let deck_service = ctx.deck_service();
        spawn(async move {
            step.set(DeleteStep::Deleting);
            match deck_service.delete_deck(owner, deck_id).await {
                Ok(()) => on_deleted.call(()),
                Err(_) => {
                    step.set(DeleteStep::Idle);
                    error.set(Some(ViewError::Unknown));
                }
            }
        });
    };

    rsx! {
        div { class: "deck-details",
            div { class: "deck-details__header",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| props.on_back.call(()),
                    "Back"
                }
                h3 { "{deck.name()}" }
                if let Some(description) = deck.description() {
                    p { "{description}" }
                }
            }
            if let Some(err) = error() {
                p { class: "alert alert--error", role: "alert", "{err.message()}" }
            }
            div { class: "deck-details__actions",
                Link { to: Route::Study { deck_id }, class: "btn btn-primary", "Study" }
                match step() {
                    DeleteStep::Idle => rsx! {
                        button {
                            class: "btn btn-danger",
                            r#type: "button",
                            onclick: move |_| step.set(DeleteStep::Confirming),
                            "Delete Deck"
                        }
                    },
                    DeleteStep::Confirming => rsx! {
                        span { class: "confirm",
                            "Delete this deck and all its flashcards? "
                            button {
                                class: "btn btn-danger",
                                r#type: "button",
                                onclick: delete,
                                "Confirm"
                            }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| step.set(DeleteStep::Idle),
                                "Cancel"
                            }
                        }
                    },
                    DeleteStep::Deleting => rsx! {
                        button { class: "btn btn-danger", r#type: "button", disabled: true, "Deleting…" }
                    },
                }
            }
            if deck.flashcards().is_empty() {
                p { class: "empty-state", "No flashcards in this deck yet" }
            } else {
                table { class: "card-table",
                    thead {
                        tr {
                            th { "Front" }
                            th { "Back" }
                        }
                    }
                    tbody {
                        for card in deck.flashcards() {
                            tr { key: "{card.id}",
                                td { "{card.front}" }
                                td { "{card.back}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
