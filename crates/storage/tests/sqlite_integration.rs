use chrono::Duration;
use kard_core::model::{AuthSession, CardId, Deck, DeckId, Flashcard, UserId, UserRecord};
use kard_core::time::fixed_now;
use storage::repository::{
    AuthRepository, CredentialRecord, DeckRepository, FlashcardRepository, StorageError,
    UserRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_deck(name: &str, offset_secs: i64) -> Deck {
    Deck::new(
        DeckId::generate(),
        name,
        Some("  words  ".to_string()),
        fixed_now() + Duration::seconds(offset_secs),
    )
    .unwrap()
}

fn build_card(front: &str, back: &str, offset_micros: i64) -> Flashcard {
    Flashcard::new(
        CardId::generate(),
        front,
        back,
        fixed_now() + Duration::microseconds(offset_micros),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_lists_decks_newest_first_with_sorted_cards() {
    let repo = connect("memdb_list_decks").await;
    let owner = UserId::generate();
    let spanish = build_deck("Spanish", 0);
    let french = build_deck("French", 60);
    repo.insert_deck(owner, &spanish).await.unwrap();
    repo.insert_deck(owner, &french).await.unwrap();

    let cards = vec![
        build_card("adios", "goodbye", 2),
        build_card("hola", "hello", 1),
    ];
    repo.insert_flashcards(owner, spanish.id(), &cards)
        .await
        .unwrap();

    let decks = repo.list_decks(owner).await.unwrap();
    assert_eq!(decks.len(), 2);
    assert_eq!(decks[0].name(), "French");
    assert_eq!(decks[1].description(), Some("words"));
    let fronts: Vec<_> = decks[1]
        .flashcards()
        .iter()
        .map(|c| c.front.as_str())
        .collect();
    assert_eq!(fronts, vec!["hola", "adios"]);

    assert!(repo.list_decks(UserId::generate()).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_keeps_microsecond_creation_order() {
    let repo = connect("memdb_micro_order").await;
    let owner = UserId::generate();
    let deck = build_deck("Batch", 0);
    repo.insert_deck(owner, &deck).await.unwrap();
    let batch: Vec<_> = (0..5)
        .map(|i| build_card(&format!("f{i}"), "b", i))
        .collect();
    repo.insert_flashcards(owner, deck.id(), &batch).await.unwrap();

    let stored = repo.get_deck(owner, deck.id()).await.unwrap().unwrap();
    assert_eq!(stored.flashcards(), batch.as_slice());
}

#[tokio::test]
async fn sqlite_deck_delete_requires_children_removed() {
    let repo = connect("memdb_delete_deck").await;
    let owner = UserId::generate();
    let deck = build_deck("Spanish", 0);
    repo.insert_deck(owner, &deck).await.unwrap();
    repo.insert_flashcards(owner, deck.id(), &[build_card("hola", "hello", 0)])
        .await
        .unwrap();

    let err = repo.delete_deck(owner, deck.id()).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let removed = repo.delete_deck_flashcards(owner, deck.id()).await.unwrap();
    assert_eq!(removed, 1);
    repo.delete_deck(owner, deck.id()).await.unwrap();
    assert!(repo.get_deck(owner, deck.id()).await.unwrap().is_none());

    let err = repo.delete_deck(owner, deck.id()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_flashcard_batch_rolls_back_on_duplicate() {
    let repo = connect("memdb_batch_rollback").await;
    let owner = UserId::generate();
    let deck = build_deck("Spanish", 0);
    repo.insert_deck(owner, &deck).await.unwrap();
    let dup = build_card("hola", "hello", 0);

    let err = repo
        .insert_flashcards(owner, deck.id(), &[dup.clone(), dup])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    let stored = repo.get_deck(owner, deck.id()).await.unwrap().unwrap();
    assert_eq!(stored.card_count(), 0);

    let err = repo
        .insert_flashcards(UserId::generate(), deck.id(), &[build_card("a", "b", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_updates_and_deletes_flashcards() {
    let repo = connect("memdb_update_card").await;
    let owner = UserId::generate();
    let deck = build_deck("Spanish", 0);
    repo.insert_deck(owner, &deck).await.unwrap();
    let card = build_card("gato", "cat", 0);
    repo.insert_flashcards(owner, deck.id(), std::slice::from_ref(&card))
        .await
        .unwrap();

    let updated = repo
        .update_flashcard(owner, card.id, "perro", "dog")
        .await
        .unwrap();
    assert_eq!(updated.front, "perro");
    assert_eq!(updated.created_at, card.created_at);

    let err = repo
        .update_flashcard(UserId::generate(), card.id, "x", "y")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    repo.delete_flashcard(owner, card.id).await.unwrap();
    let err = repo.delete_flashcard(owner, card.id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_user_mirror_and_login_stamp() {
    let repo = connect("memdb_users").await;
    let user = UserRecord::new(UserId::generate(), "ana@example.com", fixed_now());
    repo.create_user(&user).await.unwrap();

    let err = repo
        .create_user(&UserRecord::new(UserId::generate(), "ANA@example.com", fixed_now()))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let at = fixed_now() + Duration::hours(2);
    let stamped = repo.record_login(user.id, at).await.unwrap();
    assert_eq!(stamped.last_login, Some(at));
    assert_eq!(stamped.profile, user.profile);

    let fetched = repo.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(fetched, stamped);
}

#[tokio::test]
async fn sqlite_credentials_and_sessions() {
    let repo = connect("memdb_auth").await;
    let credential = CredentialRecord {
        user_id: UserId::generate(),
        email: "ana@example.com".to_string(),
        password_hash: vec![7; 32],
        created_at: fixed_now(),
    };
    repo.insert_credential(&credential).await.unwrap();
    let found = repo.find_credential("Ana@Example.com").await.unwrap();
    assert_eq!(found, Some(credential.clone()));

    let session = AuthSession {
        token: "token-1".to_string(),
        user_id: credential.user_id,
        email: credential.email.clone(),
        created_at: fixed_now(),
    };
    repo.insert_session(&session).await.unwrap();
    assert_eq!(repo.get_session("token-1").await.unwrap(), Some(session));

    repo.delete_session("token-1").await.unwrap();
    assert!(repo.get_session("token-1").await.unwrap().is_none());
    repo.delete_session("token-1").await.unwrap();
}

#[tokio::test]
async fn sqlite_delete_credential_frees_email_and_drops_sessions() {
    let repo = connect("memdb_auth_delete").await;
    let credential = CredentialRecord {
        user_id: UserId::generate(),
        email: "ana@example.com".to_string(),
        password_hash: vec![7; 32],
        created_at: fixed_now(),
    };
    repo.insert_credential(&credential).await.unwrap();
    let session = AuthSession {
        token: "token-2".to_string(),
        user_id: credential.user_id,
        email: credential.email.clone(),
        created_at: fixed_now(),
    };
    repo.insert_session(&session).await.unwrap();

    repo.delete_credential(credential.user_id).await.unwrap();
    assert!(repo.find_credential("ana@example.com").await.unwrap().is_none());
    assert!(repo.get_session("token-2").await.unwrap().is_none());

    let retry = CredentialRecord {
        user_id: UserId::generate(),
        ..credential
    };
    repo.insert_credential(&retry).await.unwrap();
    repo.delete_credential(UserId::generate()).await.unwrap();
}
