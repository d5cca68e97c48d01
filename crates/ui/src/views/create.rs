use dioxus::prelude::*;
use kard_core::model::{Deck, DeckId};
use services::{AppState, DeckServiceError};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{DraftRow, DraftRows, added_flashcards_message, map_deck_options};

fn failure_message(err: &DeckServiceError, fallback: &str) -> String {
    if err.is_validation() {
        err.to_string()
    } else {
        fallback.to_owned()
    }
}

#[component]
pub fn CreateView() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_context::<Signal<AppState>>();

    let mut selected = use_signal(|| None::<DeckId>);
    let mut new_name = use_signal(String::new);
    let mut new_description = use_signal(String::new);
    let mut creating = use_signal(|| false);
    let mut drafts = use_signal(DraftRows::new);
    let mut saving = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut success = use_signal(|| None::<String>);

    let deck_service = ctx.deck_service();
    let mut resource = use_resource(move || {
        let deck_service = deck_service.clone();
        let owner = state.read().session.as_ref().map(|s| s.user_id);
        async move {
            let owner = owner.ok_or(ViewError::SignedOut)?;
            deck_service
                .list_decks(owner)
                .await
                .map_err(|_| ViewError::Unknown)
        }
    });
    let decks: ViewState<Vec<Deck>> = view_state_from_resource(&resource);
    let selected_name = match (&decks, selected()) {
        (ViewState::Ready(decks), Some(id)) => decks
            .iter()
            .find(|deck| deck.id() == id)
            .map(|deck| deck.name().to_owned()),
        _ => None,
    };

    let create_ctx = ctx.clone();
    let create_deck = move |_: MouseEvent| {
        let Some(owner) = create_ctx.current_user() else {
            error.set(Some(ViewError::SignedOut.message().to_owned()));
            return;
        };
        let deck_service = create_ctx.deck_service();
        spawn(async move {
            creating.set(true);
            error.set(None);
            success.set(None);
            let description = new_description();
            let description = Some(description.as_str()).filter(|d| !d.trim().is_empty());
            match deck_service.create_deck(owner, &new_name(), description).await {
                Ok(deck) => {
                    selected.set(Some(deck.id()));
                    new_name.set(String::new());
                    new_description.set(String::new());
                    resource.restart();
                }
                Err(e) => error.set(Some(failure_message(
                    &e,
                    "Failed to create deck. Please try again.",
                ))),
            }
            creating.set(false);
        });
    };

    let save_ctx = ctx;
    let save = move |_: MouseEvent| {
        let (Some(owner), Some(deck_id)) = (save_ctx.current_user(), selected()) else {
            error.set(Some("Choose or create a deck first.".to_owned()));
            return;
        };
        let deck_name = selected_name.clone().unwrap_or_default();
        let deck_service = save_ctx.deck_service();
        spawn(async move {
            saving.set(true);
            error.set(None);
            success.set(None);
            let rows = drafts.read().drafts();
            match deck_service.create_flashcards(owner, deck_id, &rows).await {
                Ok(cards) => {
                    success.set(Some(added_flashcards_message(cards.len(), &deck_name)));
                    drafts.set(DraftRows::new());
                    resource.restart();
                }
                Err(e) => error.set(Some(failure_message(
                    &e,
                    "Error saving flashcards. Please try again.",
                ))),
            }
            saving.set(false);
        });
    };

    let rows = drafts.read().rows().to_vec();
    let row_count = rows.len();
    let can_save = selected().is_some() && drafts.read().any_complete();

    rsx! {
        div { class: "page create-page",
            h2 { "Create Flashcards" }
            if let Some(message) = error() {
                div { class: "alert alert--error", role: "alert", "{message}" }
            }
            if let Some(message) = success() {
                div { class: "alert alert--success", role: "status", "{message}" }
            }

            section { class: "create-page__deck",
                h3 { "Choose or Create a Deck" }
                match &decks {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { "Loading..." }
                    },
                    ViewState::Error(err) => rsx! {
                        p { class: "alert alert--error", "{err.message()}" }
                    },
                    ViewState::Ready(decks) => rsx! {
                        select {
                            id: "deck-select",
                            onchange: move |evt| selected.set(evt.value().parse().ok()),
                            option { value: "", selected: selected().is_none(), "Select a deck" }
                            for option in map_deck_options(decks) {
                                option {
                                    key: "{option.id}",
                                    value: "{option.id}",
                                    selected: selected() == Some(option.id),
                                    "{option.label}"
                                }
                            }
                        }
                    },
                }
                div { class: "create-page__new-deck",
                    input {
                        placeholder: "New deck name",
                        value: "{new_name}",
                        oninput: move |evt| new_name.set(evt.value()),
                    }
                    input {
                        placeholder: "Description (optional)",
                        value: "{new_description}",
                        oninput: move |evt| new_description.set(evt.value()),
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        disabled: creating() || new_name().trim().is_empty(),
                        onclick: create_deck,
                        if creating() { "Creating…" } else { "Create Deck" }
                    }
                }
            }

            section { class: "create-page__cards",
                h3 { "Flashcards" }
                for (index, DraftRow { key, draft }) in rows.into_iter().enumerate() {
                    div { key: "{key}", class: "draft-row",
                        span { class: "draft-row__number", "{index + 1}" }
                        input {
                            placeholder: "Front",
                            value: "{draft.front}",
                            oninput: move |evt| drafts.write().set_front(key, evt.value()),
                        }
                        input {
                            placeholder: "Back",
                            value: "{draft.back}",
                            oninput: move |evt| drafts.write().set_back(key, evt.value()),
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: row_count <= 1,
                            onclick: move |_| {
                                drafts.write().remove(key);
                            },
                            "Remove"
                        }
                    }
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| drafts.write().push_blank(),
                    "Add Card"
                }
            }

            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: saving() || !can_save,
                onclick: save,
                if saving() { "Saving…" } else { "Save Flashcards" }
            }
        }
    }
}
