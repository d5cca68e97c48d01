use kard_core::study::{StudyKeys, StudySnapshot};
use storage::local::LocalStore;

use super::test_harness::{Fixture, TEST_EMAIL, ViewKind};

#[tokio::test(flavor = "current_thread")]
async fn home_view_signed_out_invites_sign_in() {
    let fixture = Fixture::signed_out();
    let html = fixture.mount(ViewKind::Home).settle().await;
    assert!(html.contains("Welcome to Kard!"), "missing welcome in {html}");
    assert!(html.contains("Sign in to get started"), "missing link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_greets_user_and_lists_decks() {
    let fixture = Fixture::signed_in().await;
    fixture
        .seed_deck("Spanish", &[("hola", "hello"), ("adios", "goodbye")])
        .await;

    let html = fixture.mount(ViewKind::Home).settle().await;
    assert!(html.contains("Welcome back, ana!"), "missing greeting in {html}");
    assert!(html.contains("Spanish"), "missing deck in {html}");
    assert!(html.contains("2 cards"), "missing count in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_empty_state_links_to_create() {
    let fixture = Fixture::signed_in().await;
    let html = fixture.mount(ViewKind::Home).settle().await;
    assert!(html.contains("No decks yet"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn decks_view_renders_tiles_with_dates() {
    let fixture = Fixture::signed_in().await;
    fixture.seed_deck("Biology", &[("cell", "unit of life")]).await;

    let html = fixture.mount(ViewKind::Decks).settle().await;
    assert!(html.contains("Biology"), "missing deck in {html}");
    assert!(html.contains("1 card"), "missing count in {html}");
    assert!(html.contains("Created Nov 14, 2023"), "missing date in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_shows_first_card_and_persists_position() {
    let fixture = Fixture::signed_in().await;
    let deck = fixture
        .seed_deck("Spanish", &[("hola", "hello"), ("adios", "goodbye")])
        .await;

    let html = fixture.mount(ViewKind::Study(deck.id())).settle().await;
    assert!(html.contains("Card 1 of 2"), "missing position in {html}");
    assert!(html.contains("hola"), "missing front in {html}");
    assert!(html.contains("All Cards"), "missing card list in {html}");

    let keys = StudyKeys::for_deck(deck.id());
    assert_eq!(
        fixture.local.get(keys.current_index()).unwrap().as_deref(),
        Some("0")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_resumes_saved_position() {
    let fixture = Fixture::signed_in().await;
    let deck = fixture
        .seed_deck("Spanish", &[("hola", "hello"), ("adios", "goodbye")])
        .await;
    let keys = StudyKeys::for_deck(deck.id());
    fixture
        .local
        .set(keys.current_index(), &StudySnapshot::encode_index(1))
        .unwrap();
    fixture
        .local
        .set(keys.is_flipped(), &StudySnapshot::encode_flipped(true))
        .unwrap();

    let html = fixture.mount(ViewKind::Study(deck.id())).settle().await;
    assert!(html.contains("Card 2 of 2"), "missing position in {html}");
    assert!(html.contains("goodbye"), "missing back side in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_empty_deck_offers_add_flashcards() {
    let fixture = Fixture::signed_in().await;
    let deck = fixture.seed_deck("Empty", &[]).await;

    let html = fixture.mount(ViewKind::Study(deck.id())).settle().await;
    assert!(html.contains("No flashcards yet"), "missing empty state in {html}");
    assert!(html.contains("Add Flashcards"), "missing action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn auth_view_starts_in_sign_in_mode() {
    let fixture = Fixture::signed_out();
    let html = fixture.mount(ViewKind::Auth).settle().await;
    assert!(html.contains("Login"), "missing title in {html}");
    assert!(html.contains("Sign In"), "missing submit in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn create_view_lists_deck_options() {
    let fixture = Fixture::signed_in().await;
    fixture
        .seed_deck("Spanish", &[("hola", "hello"), ("adios", "goodbye")])
        .await;

    let html = fixture.mount(ViewKind::Create).settle().await;
    assert!(html.contains("Choose or Create a Deck"), "missing heading in {html}");
    assert!(html.contains("Spanish (2 cards)"), "missing option in {html}");
    assert!(html.contains("Save Flashcards"), "missing save in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_shows_account_details() {
    let fixture = Fixture::signed_in().await;
    fixture.seed_deck("Spanish", &[("hola", "hello")]).await;

    let html = fixture.mount(ViewKind::Profile).settle().await;
    assert!(html.contains(TEST_EMAIL), "missing email in {html}");
    assert!(html.contains("November 14, 2023"), "missing created date in {html}");
    assert!(html.contains("Total Decks"), "missing stats in {html}");
    assert!(html.contains("Sign Out"), "missing sign out in {html}");
}
