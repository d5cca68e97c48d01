use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kard_core::model::{AuthSession, CardId, Deck, DeckId, Flashcard, UserId, UserRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted password credential for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Deck rows, always scoped to the owning user.
#[async_trait]
pub trait DeckRepository: Send + Sync {
    /// Persist a new deck row. Cards on `deck` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken.
    async fn insert_deck(&self, owner: UserId, deck: &Deck) -> Result<(), StorageError>;

    /// All decks of `owner`, newest first, each with its cards nested.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_decks(&self, owner: UserId) -> Result<Vec<Deck>, StorageError>;

    /// One deck with its cards, or `None` when absent or owned by someone else.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_deck(&self, owner: UserId, id: DeckId) -> Result<Option<Deck>, StorageError>;

    /// Delete a deck row. Cards are not cascaded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or `StorageError::Conflict`
    /// while cards still reference the deck.
    async fn delete_deck(&self, owner: UserId, id: DeckId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    /// Insert a batch of cards into one deck. Either all rows land or none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck is missing, or
    /// `StorageError::Conflict` on duplicate ids.
    async fn insert_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
        cards: &[Flashcard],
    ) -> Result<(), StorageError>;

    /// Replace the text of a card, returning the stored card.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card is missing.
    async fn update_flashcard(
        &self,
        owner: UserId,
        id: CardId,
        front: &str,
        back: &str,
    ) -> Result<Flashcard, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card is missing.
    async fn delete_flashcard(&self, owner: UserId, id: CardId) -> Result<(), StorageError>;

    /// Delete every card of a deck, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_deck_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
    ) -> Result<u64, StorageError>;
}

/// Mirrored user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id or email exists.
    async fn create_user(&self, user: &UserRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, StorageError>;

    /// Stamp the last-login time and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user is missing.
    async fn record_login(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<UserRecord, StorageError>;
}

/// Password credentials and issued sessions.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is registered.
    async fn insert_credential(&self, credential: &CredentialRecord) -> Result<(), StorageError>;

    /// Lookup by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_credential(&self, email: &str) -> Result<Option<CredentialRecord>, StorageError>;

    /// Drop an account's credential. Removing an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_credential(&self, user_id: UserId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the token exists.
    async fn insert_session(&self, session: &AuthSession) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>, StorageError>;

    /// Removing an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_session(&self, token: &str) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredCard {
    owner: UserId,
    deck_id: DeckId,
    card: Flashcard,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    decks: Arc<Mutex<HashMap<DeckId, (UserId, Deck)>>>,
    cards: Arc<Mutex<HashMap<CardId, StoredCard>>>,
    users: Arc<Mutex<HashMap<UserId, UserRecord>>>,
    credentials: Arc<Mutex<HashMap<String, CredentialRecord>>>,
    sessions: Arc<Mutex<HashMap<String, AuthSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cards_of(&self, owner: UserId, deck_id: DeckId) -> Result<Vec<Flashcard>, StorageError> {
        let guard = self.cards.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .filter(|stored| stored.owner == owner && stored.deck_id == deck_id)
            .map(|stored| stored.card.clone())
            .collect())
    }
}

#[async_trait]
impl DeckRepository for InMemoryRepository {
    async fn insert_deck(&self, owner: UserId, deck: &Deck) -> Result<(), StorageError> {
        let mut guard = self.decks.lock().map_err(poisoned)?;
        if guard.contains_key(&deck.id()) {
            return Err(StorageError::Conflict);
        }
        let row = deck.clone().with_flashcards(Vec::new());
        guard.insert(deck.id(), (owner, row));
        Ok(())
    }

    async fn list_decks(&self, owner: UserId) -> Result<Vec<Deck>, StorageError> {
        let rows: Vec<Deck> = {
            let guard = self.decks.lock().map_err(poisoned)?;
            guard
                .values()
                .filter(|(deck_owner, _)| *deck_owner == owner)
                .map(|(_, deck)| deck.clone())
                .collect()
        };
        let mut decks = rows
            .into_iter()
            .map(|deck| {
                let cards = self.cards_of(owner, deck.id())?;
                Ok(deck.with_flashcards(cards))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        decks.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(decks)
    }

    async fn get_deck(&self, owner: UserId, id: DeckId) -> Result<Option<Deck>, StorageError> {
        let row = {
            let guard = self.decks.lock().map_err(poisoned)?;
            guard
                .get(&id)
                .filter(|(deck_owner, _)| *deck_owner == owner)
                .map(|(_, deck)| deck.clone())
        };
        match row {
            Some(deck) => {
                let cards = self.cards_of(owner, id)?;
                Ok(Some(deck.with_flashcards(cards)))
            }
            None => Ok(None),
        }
    }

    async fn delete_deck(&self, owner: UserId, id: DeckId) -> Result<(), StorageError> {
        let mut decks = self.decks.lock().map_err(poisoned)?;
        match decks.get(&id) {
            Some((deck_owner, _)) if *deck_owner == owner => {}
            _ => return Err(StorageError::NotFound),
        }
        let referenced = {
            let cards = self.cards.lock().map_err(poisoned)?;
            cards.values().any(|stored| stored.deck_id == id)
        };
        if referenced {
            return Err(StorageError::Conflict);
        }
        decks.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl FlashcardRepository for InMemoryRepository {
    async fn insert_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
        cards: &[Flashcard],
    ) -> Result<(), StorageError> {
        {
            let decks = self.decks.lock().map_err(poisoned)?;
            match decks.get(&deck_id) {
                Some((deck_owner, _)) if *deck_owner == owner => {}
                _ => return Err(StorageError::NotFound),
            }
        }
        let mut guard = self.cards.lock().map_err(poisoned)?;
        let mut seen = std::collections::HashSet::new();
        if cards
            .iter()
            .any(|card| guard.contains_key(&card.id) || !seen.insert(card.id))
        {
            return Err(StorageError::Conflict);
        }
        for card in cards {
            guard.insert(
                card.id,
                StoredCard {
                    owner,
                    deck_id,
                    card: card.clone(),
                },
            );
        }
        Ok(())
    }

    async fn update_flashcard(
        &self,
        owner: UserId,
        id: CardId,
        front: &str,
        back: &str,
    ) -> Result<Flashcard, StorageError> {
        let mut guard = self.cards.lock().map_err(poisoned)?;
        let stored = guard
            .get_mut(&id)
            .filter(|stored| stored.owner == owner)
            .ok_or(StorageError::NotFound)?;
        stored.card.front = front.to_owned();
        stored.card.back = back.to_owned();
        Ok(stored.card.clone())
    }

    async fn delete_flashcard(&self, owner: UserId, id: CardId) -> Result<(), StorageError> {
        let mut guard = self.cards.lock().map_err(poisoned)?;
        match guard.get(&id) {
            Some(stored) if stored.owner == owner => {
                guard.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn delete_deck_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
    ) -> Result<u64, StorageError> {
        let mut guard = self.cards.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|_, stored| !(stored.owner == owner && stored.deck_id == deck_id));
        Ok(u64::try_from(before - guard.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        let email_taken = guard
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if guard.contains_key(&user.id) || email_taken {
            return Err(StorageError::Conflict);
        }
        guard.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn record_login(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<UserRecord, StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        let user = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        user.last_login = Some(at);
        Ok(user.clone())
    }
}

#[async_trait]
impl AuthRepository for InMemoryRepository {
    async fn insert_credential(&self, credential: &CredentialRecord) -> Result<(), StorageError> {
        let mut guard = self.credentials.lock().map_err(poisoned)?;
        let key = credential.email.to_lowercase();
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        guard.insert(key, credential.clone());
        Ok(())
    }

    async fn find_credential(&self, email: &str) -> Result<Option<CredentialRecord>, StorageError> {
        let guard = self.credentials.lock().map_err(poisoned)?;
        Ok(guard.get(&email.to_lowercase()).cloned())
    }

    async fn delete_credential(&self, user_id: UserId) -> Result<(), StorageError> {
        let mut guard = self.credentials.lock().map_err(poisoned)?;
        guard.retain(|_, credential| credential.user_id != user_id);
        Ok(())
    }

    async fn insert_session(&self, session: &AuthSession) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        if guard.contains_key(&session.token) {
            return Err(StorageError::Conflict);
        }
        guard.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        Ok(guard.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        guard.remove(token);
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub decks: Arc<dyn DeckRepository>,
    pub flashcards: Arc<dyn FlashcardRepository>,
    pub users: Arc<dyn UserRepository>,
    pub auth: Arc<dyn AuthRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let decks: Arc<dyn DeckRepository> = Arc::new(repo.clone());
        let flashcards: Arc<dyn FlashcardRepository> = Arc::new(repo.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let auth: Arc<dyn AuthRepository> = Arc::new(repo);
        Self {
            decks,
            flashcards,
            users,
            auth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use kard_core::time::fixed_now;

    fn build_deck(name: &str, offset_secs: i64) -> Deck {
        Deck::new(
            DeckId::generate(),
            name,
            None,
            fixed_now() + Duration::seconds(offset_secs),
        )
        .unwrap()
    }

    fn build_card(front: &str, offset_secs: i64) -> Flashcard {
        Flashcard::new(
            CardId::generate(),
            front,
            "back",
            fixed_now() + Duration::seconds(offset_secs),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn list_decks_is_newest_first_with_nested_cards() {
        let repo = InMemoryRepository::new();
        let owner = UserId::generate();
        let older = build_deck("Older", 0);
        let newer = build_deck("Newer", 10);
        repo.insert_deck(owner, &older).await.unwrap();
        repo.insert_deck(owner, &newer).await.unwrap();
        repo.insert_flashcards(owner, older.id(), &[build_card("b", 2), build_card("a", 1)])
            .await
            .unwrap();

        let decks = repo.list_decks(owner).await.unwrap();
        assert_eq!(decks[0].name(), "Newer");
        assert_eq!(decks[1].card_count(), 2);
        assert_eq!(decks[1].flashcards()[0].front, "a");
    }

    #[tokio::test]
    async fn decks_are_invisible_to_other_users() {
        let repo = InMemoryRepository::new();
        let owner = UserId::generate();
        let stranger = UserId::generate();
        let deck = build_deck("Mine", 0);
        repo.insert_deck(owner, &deck).await.unwrap();

        assert!(repo.list_decks(stranger).await.unwrap().is_empty());
        assert!(repo.get_deck(stranger, deck.id()).await.unwrap().is_none());
        let err = repo.delete_deck(stranger, deck.id()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn delete_deck_requires_cards_removed_first() {
        let repo = InMemoryRepository::new();
        let owner = UserId::generate();
        let deck = build_deck("Spanish", 0);
        repo.insert_deck(owner, &deck).await.unwrap();
        repo.insert_flashcards(owner, deck.id(), &[build_card("hola", 1)])
            .await
            .unwrap();

        let err = repo.delete_deck(owner, deck.id()).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        assert_eq!(repo.delete_deck_flashcards(owner, deck.id()).await.unwrap(), 1);
        repo.delete_deck(owner, deck.id()).await.unwrap();
        assert!(repo.get_deck(owner, deck.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_flashcards_is_all_or_nothing() {
        let repo = InMemoryRepository::new();
        let owner = UserId::generate();
        let deck = build_deck("Spanish", 0);
        repo.insert_deck(owner, &deck).await.unwrap();
        let card = build_card("hola", 1);
        repo.insert_flashcards(owner, deck.id(), std::slice::from_ref(&card))
            .await
            .unwrap();

        let err = repo
            .insert_flashcards(owner, deck.id(), &[build_card("adios", 2), card])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
        let stored = repo.get_deck(owner, deck.id()).await.unwrap().unwrap();
        assert_eq!(stored.card_count(), 1);
    }

    #[tokio::test]
    async fn update_flashcard_keeps_created_at() {
        let repo = InMemoryRepository::new();
        let owner = UserId::generate();
        let deck = build_deck("Spanish", 0);
        repo.insert_deck(owner, &deck).await.unwrap();
        let card = build_card("hola", 1);
        repo.insert_flashcards(owner, deck.id(), std::slice::from_ref(&card))
            .await
            .unwrap();

        let updated = repo
            .update_flashcard(owner, card.id, "buenos dias", "good morning")
            .await
            .unwrap();
        assert_eq!(updated.created_at, card.created_at);
        assert_eq!(updated.front, "buenos dias");
    }

    #[tokio::test]
    async fn credentials_match_email_case_insensitively() {
        let repo = InMemoryRepository::new();
        let credential = CredentialRecord {
            user_id: UserId::generate(),
            email: "Ana@Example.com".to_string(),
            password_hash: vec![1, 2, 3],
            created_at: fixed_now(),
        };
        repo.insert_credential(&credential).await.unwrap();
        let found = repo.find_credential("ana@example.com").await.unwrap();
        assert_eq!(found, Some(credential.clone()));
        assert!(matches!(
            repo.insert_credential(&credential).await.unwrap_err(),
            StorageError::Conflict
        ));
    }

    #[tokio::test]
    async fn delete_credential_frees_the_email() {
        let repo = InMemoryRepository::new();
        let credential = CredentialRecord {
            user_id: UserId::generate(),
            email: "Ana@Example.com".to_string(),
            password_hash: vec![1, 2, 3],
            created_at: fixed_now(),
        };
        repo.insert_credential(&credential).await.unwrap();
        repo.delete_credential(credential.user_id).await.unwrap();
        assert!(repo.find_credential("ana@example.com").await.unwrap().is_none());
        repo.insert_credential(&credential).await.unwrap();
    }

    #[tokio::test]
    async fn record_login_stamps_user() {
        let repo = InMemoryRepository::new();
        let user = UserRecord::new(UserId::generate(), "ana@example.com", fixed_now());
        repo.create_user(&user).await.unwrap();
        let later = fixed_now() + Duration::hours(1);
        let updated = repo.record_login(user.id, later).await.unwrap();
        assert_eq!(updated.last_login, Some(later));
        assert!(matches!(
            repo.record_login(UserId::generate(), later).await.unwrap_err(),
            StorageError::NotFound
        ));
    }
}
