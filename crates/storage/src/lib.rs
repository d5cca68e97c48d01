pub mod local;
pub mod repository;
pub mod sqlite;

pub use local::{FileLocalStore, InMemoryLocalStore, LocalStore};
pub use repository::{
    AuthRepository, CredentialRecord, DeckRepository, FlashcardRepository, InMemoryRepository,
    Storage, StorageError, UserRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
