use crate::model::{DeckId, Flashcard};

/// Local-store keys for one deck's study session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyKeys {
    current_index: String,
    is_flipped: String,
    flashcards: String,
}

impl StudyKeys {
    #[must_use]
    pub fn for_deck(deck_id: DeckId) -> Self {
        Self {
            current_index: format!("study-{deck_id}-currentIndex"),
            is_flipped: format!("study-{deck_id}-isFlipped"),
            flashcards: format!("study-{deck_id}-flashcards"),
        }
    }

    #[must_use]
    pub fn current_index(&self) -> &str {
        &self.current_index
    }

    #[must_use]
    pub fn is_flipped(&self) -> &str {
        &self.is_flipped
    }

    #[must_use]
    pub fn flashcards(&self) -> &str {
        &self.flashcards
    }

    #[must_use]
    pub fn all(&self) -> [&str; 3] {
        [&self.current_index, &self.is_flipped, &self.flashcards]
    }
}

/// What a device remembers about a study session. Every field is optional
/// because each key is written and read on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudySnapshot {
    pub current_index: Option<usize>,
    pub is_flipped: Option<bool>,
    pub flashcards: Option<Vec<Flashcard>>,
}

impl StudySnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current_index.is_none() && self.is_flipped.is_none() && self.flashcards.is_none()
    }

    #[must_use]
    pub fn encode_index(index: usize) -> String {
        index.to_string()
    }

    #[must_use]
    pub fn encode_flipped(flipped: bool) -> String {
        flipped.to_string()
    }

    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn encode_flashcards(cards: &[Flashcard]) -> Result<String, serde_json::Error> {
        serde_json::to_string(cards)
    }

    #[must_use]
    pub fn parse_index(raw: &str) -> Option<usize> {
        raw.trim().parse().ok()
    }

    #[must_use]
    pub fn parse_flipped(raw: &str) -> Option<bool> {
        match raw.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn parse_flashcards(raw: &str) -> Option<Vec<Flashcard>> {
        serde_json::from_str(raw).ok()
    }
}
