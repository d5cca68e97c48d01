use dioxus::prelude::*;
use kard_core::model::{CardId, Flashcard};

use crate::context::AppContext;
use crate::views::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ItemMode {
    Viewing,
    Editing,
    Saving,
    ConfirmingDelete,
    Deleting,
}

#[derive(Props, Clone)]
pub struct CardListProps {
    pub cards: Vec<Flashcard>,
    pub current_index: usize,
    pub on_select: EventHandler<usize>,
    pub on_updated: EventHandler<Flashcard>,
    pub on_deleted: EventHandler<CardId>,
    pub on_editing: EventHandler<(CardId, bool)>,
}

impl PartialEq for CardListProps {
    fn eq(&self, other: &Self) -> bool {
        self.cards == other.cards && self.current_index == other.current_index
    }
}

/// Every card of the session with inline edit and delete.
#[component]
pub fn CardList(props: CardListProps) -> Element {
    rsx! {
        section { class: "card-list",
            h3 { "All Cards" }
            ul {
                for (index, card) in props.cards.iter().cloned().enumerate() {
                    CardListItem {
                        key: "{card.id}",
                        card,
                        index,
                        is_current: index == props.current_index,
                        on_select: props.on_select,
                        on_updated: props.on_updated,
                        on_deleted: props.on_deleted,
                        on_editing: props.on_editing,
                    }
                }
            }
        }
    }
}

#[derive(Props, Clone)]
struct CardListItemProps {
    card: Flashcard,
    index: usize,
    is_current: bool,
    on_select: EventHandler<usize>,
    on_updated: EventHandler<Flashcard>,
    on_deleted: EventHandler<CardId>,
    on_editing: EventHandler<(CardId, bool)>,
}

impl PartialEq for CardListItemProps {
    fn eq(&self, other: &Self) -> bool {
        self.card == other.card && self.index == other.index && self.is_current == other.is_current
    }
}

#[component]
fn CardListItem(props: CardListItemProps) -> Element {
    let ctx = use_context::<AppContext>();
    let mut mode = use_signal(|| ItemMode::Viewing);
    let mut front = use_signal(String::new);
    let mut back = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let card = props.card.clone();
    let card_id = card.id;
    let index = props.index;
    let on_editing = props.on_editing;
    let on_updated = props.on_updated;
    let on_deleted = props.on_deleted;
    let on_select = props.on_select;

    let start_edit = {
        let card = card.clone();
        move |_: MouseEvent| {
            front.set(card.front.clone());
            back.set(card.back.clone());
            error.set(None);
            mode.set(ItemMode::Editing);
            on_editing.call((card_id, true));
        }
    };

    let cancel_edit = move |_: MouseEvent| {
        mode.set(ItemMode::Viewing);
        error.set(None);
        on_editing.call((card_id, false));
    };

    let save_ctx = ctx.clone();
    let save = move |_: MouseEvent| {
        let Some(owner) = save_ctx.current_user() else {
            error.set(Some(ViewError::SignedOut.message().to_owned()));
            return;
        };
        let deck_service = save_ctx.deck_service();
        spawn(async move {
            mode.set(ItemMode::Saving);
            match deck_service
                .update_flashcard(owner, card_id, &front(), &back())
                .await
            {
                Ok(updated) => {
                    mode.set(ItemMode::Viewing);
                    on_editing.call((card_id, false));
                    on_updated.call(updated);
                }
                Err(e) => {
                    mode.set(ItemMode::Editing);
                    let message = if e.is_validation() {
                        e.to_string()
                    } else {
                        "Failed to update flashcard. Please try again.".to_owned()
                    };
                    error.set(Some(message));
                }
            }
        });
    };

    let delete_ctx = ctx;
    let delete = move |_: MouseEvent| {
        let Some(owner) = delete_ctx.current_user() else {
            error.set(Some(ViewError::SignedOut.message().to_owned()));
            return;
        };
        let deck_service = delete_ctx.deck_service();
        spawn(async move {
            mode.set(ItemMode::Deleting);
            match deck_service.delete_flashcard(owner, card_id).await {
                Ok(()) => on_deleted.call(card_id),
                Err(_) => {
                    mode.set(ItemMode::Viewing);
                    error.set(Some("Failed to delete flashcard. Please try again.".to_owned()));
                }
            }
        });
    };

    let item_class = if props.is_current {
        "card-list__item card-list__item--current"
    } else {
        "card-list__item"
    };

    rsx! {
        li { class: item_class,
            if let Some(message) = error() {
                p { class: "alert alert--error", role: "alert", "{message}" }
            }
            match mode() {
                ItemMode::Editing | ItemMode::Saving => rsx! {
                    div { class: "card-list__editor",
                        label { "Term" }
                        input {
                            value: "{front}",
                            oninput: move |evt| front.set(evt.value()),
                        }
                        label { "Definition" }
                        textarea {
                            value: "{back}",
                            oninput: move |evt| back.set(evt.value()),
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: mode() == ItemMode::Saving,
                            onclick: save,
                            if mode() == ItemMode::Saving { "Saving…" } else { "Save" }
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: mode() == ItemMode::Saving,
                            onclick: cancel_edit,
                            "Cancel"
                        }
                    }
                },
                ItemMode::Viewing | ItemMode::ConfirmingDelete | ItemMode::Deleting => rsx! {
                    button {
                        class: "card-list__select",
                        r#type: "button",
                        onclick: move |_| on_select.call(index),
                        span { class: "card-list__front", "{card.front}" }
                        span { class: "card-list__back", "{card.back}" }
                    }
                    div { class: "card-list__actions",
                        match mode() {
                            ItemMode::ConfirmingDelete => rsx! {
                                span { class: "confirm", "Delete this card? " }
                                button {
                                    class: "btn btn-danger",
                                    r#type: "button",
                                    onclick: delete,
                                    "Confirm"
                                }
                                button {
                                    class: "btn btn-secondary",
                                    r#type: "button",
                                    onclick: move |_| mode.set(ItemMode::Viewing),
                                    "Cancel"
                                }
                            },
                            ItemMode::Deleting => rsx! {
                                button { class: "btn btn-danger", r#type: "button", disabled: true, "Deleting…" }
                            },
                            _ => rsx! {
                                button {
                                    class: "btn btn-secondary",
                                    r#type: "button",
                                    onclick: start_edit,
                                    "Edit"
                                }
                                button {
                                    class: "btn btn-danger",
                                    r#type: "button",
                                    onclick: move |_| mode.set(ItemMode::ConfirmingDelete),
                                    "Delete"
                                }
                            },
                        }
                    }
                },
            }
        }
    }
}
