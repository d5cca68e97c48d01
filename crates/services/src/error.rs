//! Shared error types for the services crate.

use thiserror::Error;

use kard_core::model::{DeckError, FlashcardError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::credentials::CredentialError;

/// Errors emitted by `DeckService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeckServiceError {
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Flashcard(#[from] FlashcardError),
    #[error("add at least one flashcard with both a front and a back")]
    NoCompleteFlashcards,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DeckServiceError {
    /// True for failures caught before any storage call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Deck(_) | Self::Flashcard(_) | Self::NoCompleteFlashcards
        )
    }
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for UserServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    User(#[from] UserServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// True when the caller supplied bad input or credentials, as opposed to
    /// a backend failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail
                | Self::EmptyPassword
                | Self::PasswordMismatch
                | Self::InvalidCredentials
                | Self::EmailTaken
        )
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
