use chrono::{DateTime, Utc};
use kard_core::model::{AuthSession, CardId, Deck, DeckId, Flashcard, Profile, UserId, UserRecord};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{CredentialRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps constraint violations to `Conflict`; everything else is a
/// connection-level failure.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.is_foreign_key_violation() =>
        {
            StorageError::Conflict
        }
        sqlx::Error::RowNotFound => StorageError::NotFound,
        _ => StorageError::Connection(e.to_string()),
    }
}

fn text(row: &SqliteRow, column: &str) -> Result<String, StorageError> {
    row.try_get::<String, _>(column).map_err(ser)
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, StorageError> {
    row.try_get::<DateTime<Utc>, _>(column).map_err(ser)
}

pub(crate) fn deck_id(row: &SqliteRow, column: &str) -> Result<DeckId, StorageError> {
    text(row, column)?.parse().map_err(ser)
}

fn card_id(row: &SqliteRow, column: &str) -> Result<CardId, StorageError> {
    text(row, column)?.parse().map_err(ser)
}

fn user_id(row: &SqliteRow, column: &str) -> Result<UserId, StorageError> {
    text(row, column)?.parse().map_err(ser)
}

/// Expects `id, front, back, created_at`.
pub(crate) fn map_flashcard_row(row: &SqliteRow) -> Result<Flashcard, StorageError> {
    Ok(Flashcard {
        id: card_id(row, "id")?,
        front: text(row, "front")?,
        back: text(row, "back")?,
        created_at: timestamp(row, "created_at")?,
    })
}

/// Expects `id, name, description, created_at`. Cards are attached by the caller.
pub(crate) fn map_deck_row(row: &SqliteRow) -> Result<Deck, StorageError> {
    Deck::new(
        deck_id(row, "id")?,
        text(row, "name")?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        timestamp(row, "created_at")?,
    )
    .map_err(ser)
}

/// Expects `id, email, created_at, last_login, display_name, bio`.
pub(crate) fn map_user_row(row: &SqliteRow) -> Result<UserRecord, StorageError> {
    Ok(UserRecord {
        id: user_id(row, "id")?,
        email: text(row, "email")?,
        created_at: timestamp(row, "created_at")?,
        last_login: row
            .try_get::<Option<DateTime<Utc>>, _>("last_login")
            .map_err(ser)?,
        profile: Profile {
            display_name: row
                .try_get::<Option<String>, _>("display_name")
                .map_err(ser)?,
            bio: row.try_get::<Option<String>, _>("bio").map_err(ser)?,
        },
    })
}

pub(crate) fn map_credential_row(row: &SqliteRow) -> Result<CredentialRecord, StorageError> {
    Ok(CredentialRecord {
        user_id: user_id(row, "user_id")?,
        email: text(row, "email")?,
        password_hash: row.try_get::<Vec<u8>, _>("password_hash").map_err(ser)?,
        created_at: timestamp(row, "created_at")?,
    })
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<AuthSession, StorageError> {
    Ok(AuthSession {
        token: text(row, "token")?,
        user_id: user_id(row, "user_id")?,
        email: text(row, "email")?,
        created_at: timestamp(row, "created_at")?,
    })
}
