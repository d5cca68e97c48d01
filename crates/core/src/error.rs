use thiserror::Error;

use crate::model::{DeckError, FlashcardError};
use crate::study::StudyError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Flashcard(#[from] FlashcardError),
    #[error(transparent)]
    Study(#[from] StudyError),
}
