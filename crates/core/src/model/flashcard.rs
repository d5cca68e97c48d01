use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CardId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlashcardError {
    #[error("flashcard front cannot be empty")]
    EmptyFront,

    #[error("flashcard back cannot be empty")]
    EmptyBack,
}

/// A term/definition pair belonging to one deck.
///
/// Fields are public because restored study snapshots carry cards verbatim;
/// use [`Flashcard::new`] when the text comes from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: CardId,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Creates a flashcard from user-entered text.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError::EmptyFront` or `FlashcardError::EmptyBack`
    /// when a side is empty after trimming.
    pub fn new(
        id: CardId,
        front: impl Into<String>,
        back: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FlashcardError> {
        let (front, back) = validate_sides(&front.into(), &back.into())?;
        Ok(Self {
            id,
            front,
            back,
            created_at,
        })
    }
}

fn validate_sides(front: &str, back: &str) -> Result<(String, String), FlashcardError> {
    let front = front.trim();
    if front.is_empty() {
        return Err(FlashcardError::EmptyFront);
    }
    let back = back.trim();
    if back.is_empty() {
        return Err(FlashcardError::EmptyBack);
    }
    Ok((front.to_owned(), back.to_owned()))
}

/// Sorts cards ascending by creation time. Ties keep their relative order.
pub fn sort_by_creation(cards: &mut [Flashcard]) {
    cards.sort_by_key(|card| card.created_at);
}

/// One row of the "add flashcards" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardDraft {
    pub front: String,
    pub back: String,
}

impl FlashcardDraft {
    #[must_use]
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// True when both sides have text after trimming.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.front.trim().is_empty() && !self.back.trim().is_empty()
    }

    /// Trimmed `(front, back)`.
    ///
    /// # Errors
    ///
    /// Returns the first empty side.
    pub fn validate(&self) -> Result<(String, String), FlashcardError> {
        validate_sides(&self.front, &self.back)
    }
}
