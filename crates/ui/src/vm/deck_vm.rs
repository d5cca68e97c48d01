use kard_core::model::{Deck, DeckId};

use super::time_fmt::format_date;

/// Everything a deck tile shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckCardVm {
    pub id: DeckId,
    pub name: String,
    pub description: Option<String>,
    pub card_count: usize,
    pub card_count_label: String,
    pub created_label: String,
}

#[must_use]
pub fn map_deck_cards(decks: &[Deck]) -> Vec<DeckCardVm> {
    decks
        .iter()
        .map(|deck| DeckCardVm {
            id: deck.id(),
            name: deck.name().to_owned(),
            description: deck.description().map(str::to_owned),
            card_count: deck.card_count(),
            card_count_label: card_count_label(deck.card_count()),
            created_label: format!("Created {}", format_date(deck.created_at())),
        })
        .collect()
}

#[must_use]
pub fn card_count_label(count: usize) -> String {
    if count == 1 {
        "1 card".to_owned()
    } else {
        format!("{count} cards")
    }
}

/// UI-ready representation of a deck for selection controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckOptionVm {
    pub id: DeckId,
    pub label: String,
}

/// Convert domain decks into selection-friendly view models.
#[must_use]
pub fn map_deck_options(decks: &[Deck]) -> Vec<DeckOptionVm> {
    decks
        .iter()
        .map(|deck| DeckOptionVm {
            id: deck.id(),
            label: format!("{} ({})", deck.name(), card_count_label(deck.card_count())),
        })
        .collect()
}

#[must_use]
pub fn added_flashcards_message(count: usize, deck_name: &str) -> String {
    format!("Successfully added {count} flashcard(s) to {deck_name}!")
}
