use std::sync::Arc;

use kard_core::model::{FlashcardDraft, UserId};
use kard_core::time::fixed_now;
use services::{Clock, DeckService, DeckServiceError};
use storage::repository::{Storage, StorageError};

#[tokio::test]
async fn deck_flow_create_edit_delete() {
    let storage = Storage::sqlite("sqlite:file:memdb_deck_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let service = DeckService::new(
        Clock::fixed(fixed_now()),
        Arc::clone(&storage.decks),
        Arc::clone(&storage.flashcards),
    );
    let owner = UserId::generate();

    let deck = service
        .create_deck(owner, "Biology", Some("Cells and more"))
        .await
        .expect("create deck");
    let cards = service
        .create_flashcards(
            owner,
            deck.id(),
            &[
                FlashcardDraft::new("cell", "basic unit of life"),
                FlashcardDraft::new("  ", "skipped"),
                FlashcardDraft::new("atp", "energy currency"),
            ],
        )
        .await
        .expect("create cards");
    assert_eq!(cards.len(), 2);

    let updated = service
        .update_flashcard(owner, cards[0].id, " cell ", " smallest unit of life ")
        .await
        .expect("update card");
    assert_eq!(updated.back, "smallest unit of life");
    assert_eq!(updated.created_at, cards[0].created_at);

    service
        .delete_flashcard(owner, cards[1].id)
        .await
        .expect("delete card");

    let listed = service.list_decks(owner).await.expect("list decks");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].card_count(), 1);
    assert_eq!(listed[0].flashcards()[0].back, "smallest unit of life");

    service.delete_deck(owner, deck.id()).await.expect("delete deck");
    assert!(service.list_decks(owner).await.unwrap().is_empty());

    let err = service.delete_deck(owner, deck.id()).await.unwrap_err();
    assert!(matches!(err, DeckServiceError::Storage(StorageError::NotFound)));
}

#[tokio::test]
async fn flashcards_for_missing_deck_write_nothing() {
    let storage = Storage::sqlite("sqlite:file:memdb_missing_deck?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let service = DeckService::new(
        Clock::fixed(fixed_now()),
        Arc::clone(&storage.decks),
        Arc::clone(&storage.flashcards),
    );
    let err = service
        .create_flashcards(
            UserId::generate(),
            kard_core::model::DeckId::generate(),
            &[FlashcardDraft::new("a", "b")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DeckServiceError::Storage(StorageError::NotFound)));
}
