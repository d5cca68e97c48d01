use kard_core::model::{CardId, DeckId, Flashcard, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, map_flashcard_row};
use crate::repository::{FlashcardRepository, StorageError};

#[async_trait::async_trait]
impl FlashcardRepository for SqliteRepository {
    async fn insert_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
        cards: &[Flashcard],
    ) -> Result<(), StorageError> {
        let owner = owner.to_string();
        let deck_id = deck_id.to_string();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let owned = sqlx::query("SELECT 1 FROM decks WHERE id = ?1 AND user_id = ?2")
            .bind(&deck_id)
            .bind(&owner)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if owned.is_none() {
            return Err(StorageError::NotFound);
        }

        for card in cards {
            sqlx::query(
                r"
                INSERT INTO flashcards (id, deck_id, user_id, front, back, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(card.id.to_string())
            .bind(&deck_id)
            .bind(&owner)
            .bind(&card.front)
            .bind(&card.back)
            .bind(card.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)
    }

    async fn update_flashcard(
        &self,
        owner: UserId,
        id: CardId,
        front: &str,
        back: &str,
    ) -> Result<Flashcard, StorageError> {
        let row = sqlx::query(
            r"
            UPDATE flashcards
            SET front = ?1, back = ?2
            WHERE id = ?3 AND user_id = ?4
            RETURNING id, front, back, created_at
            ",
        )
        .bind(front)
        .bind(back)
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => map_flashcard_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn delete_flashcard(&self, owner: UserId, id: CardId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM flashcards WHERE id = ?1 AND user_id = ?2")
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

    async fn delete_deck_flashcards(
        &self,
        owner: UserId,
        deck_id: DeckId,
    ) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM flashcards WHERE deck_id = ?1 AND user_id = ?2")
            .bind(deck_id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(res.rows_affected())
    }
}
