use std::sync::Arc;

use kard_core::model::{CardId, Deck, DeckId, Flashcard, FlashcardDraft, UserId};
use storage::repository::{DeckRepository, FlashcardRepository};

use crate::Clock;
use crate::error::DeckServiceError;

/// Deck and flashcard persistence for one signed-in user at a time.
///
/// Every call is a single repository round trip except `delete_deck`, which
/// removes children first and is not transactional.
#[derive(Clone)]
pub struct DeckService {
    clock: Clock,
    decks: Arc<dyn DeckRepository>,
    flashcards: Arc<dyn FlashcardRepository>,
}

impl DeckService {
    #[must_use]
    pub fn new(
        clock: Clock,
        decks: Arc<dyn DeckRepository>,
        flashcards: Arc<dyn FlashcardRepository>,
    ) -> Self {
        Self {
            clock,
            decks,
            flashcards,
        }
    }

    /// All decks of `owner`, newest first, with cards nested.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` if repository access fails.
    pub async fn list_decks(&self, owner: UserId) -> Result<Vec<Deck>, DeckServiceError> {
        let decks = self
            .decks
            .list_decks(owner)
            .await
            .inspect_err(|e| tracing::error!(%owner, error = %e, "error fetching decks"))?;
        Ok(decks)
    }

    /// Decks whose name or description contains `query`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` if repository access fails.
    pub async fn search_decks(
        &self,
        owner: UserId,
        query: &str,
    ) -> Result<Vec<Deck>, DeckServiceError> {
        let mut decks = self.list_decks(owner).await?;
        decks.retain(|deck| deck.matches_query(query));
        Ok(decks)
    }

    /// Returns `Ok(None)` when the deck does not exist for this user.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` if repository access fails.
    pub async fn get_deck(
        &self,
        owner: UserId,
        deck_id: DeckId,
    ) -> Result<Option<Deck>, DeckServiceError> {
        let deck = self
            .decks
            .get_deck(owner, deck_id)
            .await
            .inspect_err(|e| tracing::error!(%deck_id, error = %e, "error fetching deck"))?;
        Ok(deck)
    }

    /// Create an empty deck with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Deck` for an empty name.
    /// Returns `DeckServiceError::Storage` if persistence fails.
    pub async fn create_deck(
        &self,
        owner: UserId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Deck, DeckServiceError> {
        let deck = Deck::new(
            DeckId::generate(),
            name,
            description.map(str::to_owned),
            self.clock.now(),
        )?;
        self.decks
            .insert_deck(owner, &deck)
            .await
            .inspect_err(|e| tracing::error!(%owner, error = %e, "error creating deck"))?;
        tracing::info!(deck_id = %deck.id(), name = deck.name(), "deck created");
        Ok(deck)
    }

    /// Persist the complete drafts as new cards, in input order.
    ///
    /// Incomplete rows are skipped. Cards in one batch get creation times one
    /// microsecond apart so sorting by creation keeps the form order.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::NoCompleteFlashcards` when no draft has both
    /// sides, before touching storage.
    /// Returns `DeckServiceError::Storage` if the batch insert fails; no card is
    /// written in that case.
    pub async fn create_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
        drafts: &[FlashcardDraft],
    ) -> Result<Vec<Flashcard>, DeckServiceError> {
        let complete: Vec<(String, String)> = drafts
            .iter()
            .filter_map(|draft| draft.validate().ok())
            .collect();
        if complete.is_empty() {
            return Err(DeckServiceError::NoCompleteFlashcards);
        }

        let instants = self.clock.creation_instants(complete.len());
        let cards = complete
            .into_iter()
            .zip(instants)
            .map(|((front, back), created_at)| {
                Flashcard::new(CardId::generate(), front, back, created_at)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.flashcards
            .insert_flashcards(owner, deck_id, &cards)
            .await
            .inspect_err(|e| tracing::error!(%deck_id, error = %e, "error saving flashcards"))?;
        tracing::info!(%deck_id, count = cards.len(), "flashcards added");
        Ok(cards)
    }

    /// Replace a card's text. Both sides are trimmed and must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Flashcard` for an empty side.
    /// Returns `DeckServiceError::Storage` if the card is missing or the write fails.
    pub async fn update_flashcard(
        &self,
        owner: UserId,
        card_id: CardId,
        front: &str,
        back: &str,
    ) -> Result<Flashcard, DeckServiceError> {
        let (front, back) = FlashcardDraft::new(front, back).validate()?;
        let card = self
            .flashcards
            .update_flashcard(owner, card_id, &front, &back)
            .await
            .inspect_err(|e| tracing::error!(%card_id, error = %e, "error updating flashcard"))?;
        Ok(card)
    }

    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` if the card is missing or the delete fails.
    pub async fn delete_flashcard(
        &self,
        owner: UserId,
        card_id: CardId,
    ) -> Result<(), DeckServiceError> {
        self.flashcards
            .delete_flashcard(owner, card_id)
            .await
            .inspect_err(|e| tracing::error!(%card_id, error = %e, "error deleting flashcard"))?;
        Ok(())
    }

    /// Delete all of the deck's cards, then the deck.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` from whichever step failed. If the
    /// second step fails the deck survives without cards.
    pub async fn delete_deck(&self, owner: UserId, deck_id: DeckId) -> Result<(), DeckServiceError> {
        let removed = self
            .flashcards
            .delete_deck_flashcards(owner, deck_id)
            .await
            .inspect_err(|e| tracing::error!(%deck_id, error = %e, "error deleting deck flashcards"))?;
        self.decks
            .delete_deck(owner, deck_id)
            .await
            .inspect_err(|e| tracing::error!(%deck_id, error = %e, "error deleting deck"))?;
        tracing::info!(%deck_id, removed, "deck deleted");
        Ok(())
    }
}
