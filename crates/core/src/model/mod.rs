mod account;
mod deck;
mod flashcard;
mod ids;

pub use account::{AuthSession, FALLBACK_DISPLAY_NAME, Profile, UserRecord, display_name_from_email};
pub use deck::{Deck, DeckError};
pub use flashcard::{Flashcard, FlashcardDraft, FlashcardError, sort_by_creation};
pub use ids::{CardId, DeckId, ParseIdError, UserId};
