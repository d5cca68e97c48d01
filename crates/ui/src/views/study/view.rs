use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::use_navigator;
use kard_core::model::{CardId, DeckId, Flashcard};
use kard_core::study::{EditReporter, KeyDispatcher, StudyError};
use services::{StudyController, StudyOutcome};

use super::card_list::CardList;
use super::keys::study_key;
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// Render-ready copy of the controller state.
#[derive(Clone, Debug, PartialEq)]
struct StudyFrame {
    cards: Vec<Flashcard>,
    current_index: usize,
    current: Option<Flashcard>,
    is_flipped: bool,
    is_first: bool,
    is_last: bool,
    position_label: String,
    progress_percent: usize,
}

impl StudyFrame {
    fn from_controller(controller: &StudyController) -> Self {
        let session = controller.session();
        Self {
            cards: session.flashcards().to_vec(),
            current_index: session.current_card_index(),
            current: session.current_card().cloned(),
            is_flipped: session.is_flipped(),
            is_first: session.is_first(),
            is_last: session.is_last(),
            position_label: session.position_label(),
            progress_percent: session.progress_percent(),
        }
    }
}

/// What decides whether the study root should take keyboard focus back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FocusState {
    editing: bool,
    tips_open: bool,
    current_index: Option<usize>,
    card_count: usize,
}

impl FocusState {
    /// Keys only reach the study root while no editor or modal holds focus.
    fn wants_root_focus(self) -> bool {
        !self.editing && !self.tips_open
    }
}

#[component]
pub fn StudyView(deck_id: DeckId) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut controller = use_signal(|| None::<StudyController>);
    let mut dispatcher = use_signal(KeyDispatcher::new);
    let mut deck_name = use_signal(String::new);
    let mut show_tips = use_signal(|| false);

    let mut last_focus = use_signal(|| None::<FocusState>);

    let resource = use_resource(use_reactive((&deck_id,), move |(deck_id,)| {
        let deck_service = ctx.deck_service();
        let local_store = ctx.local_store();
        let policy = ctx.resume_policy();
        let owner = ctx.current_user();
        async move {
            // A controller left over from another deck must not receive keys.
            controller.set(None);
            dispatcher.set(KeyDispatcher::new());
            let owner = owner.ok_or(ViewError::SignedOut)?;
            let deck = deck_service
                .get_deck(owner, deck_id)
                .await
                .map_err(|_| ViewError::Unknown)?
                .ok_or(ViewError::NotFound)?;
            deck_name.set(deck.name().to_owned());
            match StudyController::open(&deck, local_store, policy) {
                Ok(opened) => {
                    controller.set(Some(opened));
                    Ok::<_, ViewError>(())
                }
                Err(StudyError::EmptyDeck) => Err(ViewError::EmptyDeck),
                Err(_) => Err(ViewError::Unknown),
            }
        }
    }));
    let state = view_state_from_resource(&resource);

    // Editors, deletions and the tips modal all pull focus off the root;
    // hand it back once none of them is in the way.
    use_effect(move || {
        let focus = FocusState {
            editing: dispatcher.read().is_suspended(),
            tips_open: show_tips(),
            current_index: controller
                .read()
                .as_ref()
                .map(|c| c.session().current_card_index()),
            card_count: controller
                .read()
                .as_ref()
                .map_or(0, |c| c.session().flashcards().len()),
        };
        if *last_focus.peek() == Some(focus) {
            return;
        }
        last_focus.set(Some(focus));
        if focus.wants_root_focus() {
            let _ = eval("document.getElementById('study-root')?.focus();");
        }
    });

    let exit = use_callback(move |()| {
        let taken = controller.write().take();
        if let Some(taken) = taken {
            taken.exit();
        }
        navigator.push(Route::Decks {});
    });

    let on_key = move |evt: KeyboardEvent| {
        let key = study_key(&evt.data.key());
        let outcome = controller
            .write()
            .as_mut()
            .map(|c| c.handle_key(key, &dispatcher.read()));
        match outcome {
            Some(StudyOutcome::Applied(_)) => evt.prevent_default(),
            Some(StudyOutcome::ExitRequested) => {
                evt.prevent_default();
                exit.call(());
            }
            Some(StudyOutcome::Ignored) | None => {}
        }
    };

    let frame = controller.read().as_ref().map(StudyFrame::from_controller);

    rsx! {
        div { class: "page study-page", id: "study-root", tabindex: "0", onkeydown: on_key,
            header { class: "study-page__header",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| exit.call(()),
                    "Exit"
                }
                h2 { "{deck_name}" }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| show_tips.set(true),
                    "Study Tips"
                }
            }
            if show_tips() {
                TipsModal { on_close: move |()| show_tips.set(false) }
            }
            match (state, frame) {
                (ViewState::Idle | ViewState::Loading, _) => rsx! {
                    p { "Loading..." }
                },
                (ViewState::Error(ViewError::EmptyDeck), _) => rsx! { EmptyDeck {} },
                (ViewState::Error(err), _) => rsx! {
                    p { class: "alert alert--error", "{err.message()}" }
                },
                (ViewState::Ready(()), None) => rsx! {
                    p { "Loading..." }
                },
                (ViewState::Ready(()), Some(frame)) if frame.cards.is_empty() => rsx! { EmptyDeck {} },
                (ViewState::Ready(()), Some(frame)) => rsx! {
                    div { class: "study-progress",
                        div { class: "study-progress__bar",
                            div { class: "study-progress__fill", style: "width: {frame.progress_percent}%" }
                        }
                        p { class: "study-progress__label", "{frame.position_label}" }
                    }
                    if let Some(card) = frame.current.as_ref() {
                        button {
                            class: if frame.is_flipped { "flashcard flashcard--flipped" } else { "flashcard" },
                            r#type: "button",
                            onclick: move |_| {
                                if let Some(c) = controller.write().as_mut() {
                                    c.flip();
                                }
                            },
                            span { class: "flashcard__side",
                                if frame.is_flipped { "Back" } else { "Front" }
                            }
                            p { class: "flashcard__text",
                                if frame.is_flipped { "{card.back}" } else { "{card.front}" }
                            }
                        }
                    }
                    div { class: "study-nav",
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: frame.is_first,
                            onclick: move |_| {
                                if let Some(c) = controller.write().as_mut() {
                                    c.prev();
                                }
                            },
                            "Previous"
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: frame.is_last,
                            onclick: move |_| {
                                if let Some(c) = controller.write().as_mut() {
                                    c.next();
                                }
                            },
                            "Next"
                        }
                    }
                    CardList {
                        cards: frame.cards.clone(),
                        current_index: frame.current_index,
                        on_select: move |index: usize| {
                            if let Some(c) = controller.write().as_mut() {
                                if let Err(e) = c.go_to(index) {
                                    tracing::warn!(error = %e, "ignoring card selection");
                                }
                            }
                        },
                        on_updated: move |card: Flashcard| {
                            if let Some(c) = controller.write().as_mut() {
                                c.update_card(card);
                            }
                        },
                        on_deleted: move |id: CardId| {
                            dispatcher.write().forget(id);
                            if let Some(c) = controller.write().as_mut() {
                                c.delete_card(id);
                            }
                        },
                        on_editing: move |(id, editing): (CardId, bool)| {
                            dispatcher.write().report_editing(id, editing);
                        },
                    }
                },
            }
        }
    }
}

#[component]
fn EmptyDeck() -> Element {
    let navigator = use_navigator();
    rsx! {
        div { class: "empty-state",
            p { "No flashcards yet" }
            p { "Add some flashcards to start studying" }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| {
                    navigator.push(Route::Create {});
                },
                "Add Flashcards"
            }
        }
    }
}

#[component]
fn TipsModal(on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "modal-overlay",
            div { class: "modal", role: "dialog", aria_modal: "true",
                h3 { "Study Tips & Shortcuts" }
                h4 { "Keyboard Shortcuts" }
                ul {
                    li { kbd { "←" } " / " kbd { "→" } " Navigate between cards" }
                    li { kbd { "Space" } " or " kbd { "Enter" } " Flip card" }
                    li { kbd { "Esc" } " Exit to deck list" }
                }
                h4 { "Mouse Controls" }
                ul {
                    li { "Click anywhere on the card to flip it" }
                    li { "Use the arrow buttons to navigate" }
                    li { "Click any card in the list below to jump to it" }
                }
                h4 { "Study Tips" }
                ul {
                    li { "Try to recall the answer before flipping the card" }
                    li { "Focus on cards you find challenging" }
                    li { "Use spaced repetition - review cards at increasing intervals" }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| on_close.call(()),
                    "Got it"
                }
            }
        }
    }
}
