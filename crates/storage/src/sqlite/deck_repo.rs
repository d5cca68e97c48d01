use std::collections::HashMap;

use kard_core::model::{Deck, DeckId, Flashcard, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, deck_id, map_deck_row, map_flashcard_row};
use crate::repository::{DeckRepository, StorageError};

#[async_trait::async_trait]
impl DeckRepository for SqliteRepository {
    async fn insert_deck(&self, owner: UserId, deck: &Deck) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO decks (id, user_id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(deck.id().to_string())
        .bind(owner.to_string())
        .bind(deck.name())
        .bind(deck.description())
        .bind(deck.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_decks(&self, owner: UserId) -> Result<Vec<Deck>, StorageError> {
        let owner = owner.to_string();
        let deck_rows = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM decks
            WHERE user_id = ?1
            ",
        )
        .bind(&owner)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let card_rows = sqlx::query(
            r"
            SELECT id, deck_id, front, back, created_at
            FROM flashcards
            WHERE user_id = ?1
            ",
        )
        .bind(&owner)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut cards_by_deck: HashMap<DeckId, Vec<Flashcard>> = HashMap::new();
        for row in &card_rows {
            cards_by_deck
                .entry(deck_id(row, "deck_id")?)
                .or_default()
                .push(map_flashcard_row(row)?);
        }

        let mut decks = Vec::with_capacity(deck_rows.len());
        for row in &deck_rows {
            let deck = map_deck_row(row)?;
            let cards = cards_by_deck.remove(&deck.id()).unwrap_or_default();
            decks.push(deck.with_flashcards(cards));
        }
        decks.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(decks)
    }

    async fn get_deck(&self, owner: UserId, id: DeckId) -> Result<Option<Deck>, StorageError> {
        let owner = owner.to_string();
        let id = id.to_string();
        let row = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM decks WHERE id = ?1 AND user_id = ?2
            ",
        )
        .bind(&id)
        .bind(&owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let deck = map_deck_row(&row)?;

        let card_rows = sqlx::query(
            r"
            SELECT id, front, back, created_at
            FROM flashcards
            WHERE deck_id = ?1 AND user_id = ?2
            ",
        )
        .bind(&id)
        .bind(&owner)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let cards = card_rows
            .iter()
            .map(map_flashcard_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(deck.with_flashcards(cards)))
    }

    async fn delete_deck(&self, owner: UserId, id: DeckId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM decks WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
