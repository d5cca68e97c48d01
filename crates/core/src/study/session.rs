use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{CardId, Deck, DeckId, Flashcard, sort_by_creation};
use crate::study::keys::StudyCommand;
use crate::study::snapshot::StudySnapshot;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudyError {
    #[error("deck has no flashcards to study")]
    EmptyDeck,

    #[error("card index {index} is out of range for {len} cards")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown resume policy `{0}`")]
    UnknownPolicy(String),
}

/// How a persisted snapshot is reconciled with freshly loaded deck data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumePolicy {
    /// The snapshot wins: cached cards, index and flip state are restored
    /// as saved, even when the deck changed elsewhere.
    #[default]
    PreferPersisted,
    /// The deck wins: cards come from storage and the snapshot only picks
    /// which card to show.
    PreferDeck,
}

impl ResumePolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreferPersisted => "prefer-persisted",
            Self::PreferDeck => "prefer-deck",
        }
    }
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumePolicy {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefer-persisted" | "persisted" => Ok(Self::PreferPersisted),
            "prefer-deck" | "deck" => Ok(Self::PreferDeck),
            other => Err(StudyError::UnknownPolicy(other.to_owned())),
        }
    }
}

/// Ephemeral state of studying one deck.
///
/// Invariants:
/// - `flashcards` is sorted ascending by `created_at`
/// - `current_card_index < flashcards.len()` when non-empty, `0` otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    deck_id: DeckId,
    flashcards: Vec<Flashcard>,
    current_card_index: usize,
    is_flipped: bool,
}

impl StudySession {
    /// Starts at the first card, front side up.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::EmptyDeck` when the deck has no cards.
    pub fn start(deck: &Deck) -> Result<Self, StudyError> {
        let session = Self::fresh(deck);
        if session.flashcards.is_empty() {
            return Err(StudyError::EmptyDeck);
        }
        Ok(session)
    }

    /// Rebuilds a session from a saved snapshot.
    ///
    /// Each snapshot field is applied independently; missing fields fall back
    /// to the fresh deck state. A saved empty card list counts as missing.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::EmptyDeck` when no cards remain after resuming.
    pub fn resume(
        deck: &Deck,
        snapshot: StudySnapshot,
        policy: ResumePolicy,
    ) -> Result<Self, StudyError> {
        let mut session = Self::fresh(deck);
        let StudySnapshot {
            current_index,
            is_flipped,
            flashcards,
        } = snapshot;
        let flashcards = flashcards.filter(|cards| !cards.is_empty());

        match policy {
            ResumePolicy::PreferPersisted => {
                if let Some(mut cards) = flashcards {
                    sort_by_creation(&mut cards);
                    session.flashcards = cards;
                }
                if let Some(index) = current_index {
                    session.current_card_index = index;
                }
                if let Some(flipped) = is_flipped {
                    session.is_flipped = flipped;
                }
            }
            ResumePolicy::PreferDeck => {
                let saved_card = flashcards
                    .as_ref()
                    .zip(current_index)
                    .and_then(|(cards, index)| cards.get(index))
                    .and_then(|card| session.position_of(card.id));
                match saved_card {
                    Some(position) => {
                        session.current_card_index = position;
                        session.is_flipped = is_flipped.unwrap_or(false);
                    }
                    None => {
                        if let Some(index) = current_index {
                            session.current_card_index = index;
                        }
                    }
                }
            }
        }

        session.clamp_index();
        if session.flashcards.is_empty() {
            return Err(StudyError::EmptyDeck);
        }
        Ok(session)
    }

    fn fresh(deck: &Deck) -> Self {
        let mut flashcards = deck.flashcards().to_vec();
        sort_by_creation(&mut flashcards);
        Self {
            deck_id: deck.id(),
            flashcards,
            current_card_index: 0,
            is_flipped: false,
        }
    }

    fn clamp_index(&mut self) {
        let last = self.flashcards.len().saturating_sub(1);
        if self.current_card_index > last {
            self.current_card_index = last;
        }
    }

    fn position_of(&self, id: CardId) -> Option<usize> {
        self.flashcards.iter().position(|card| card.id == id)
    }

    // Accessors
    #[must_use]
    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    #[must_use]
    pub fn flashcards(&self) -> &[Flashcard] {
        &self.flashcards
    }

    #[must_use]
    pub fn current_card_index(&self) -> usize {
        self.current_card_index
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flashcards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flashcards.is_empty()
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.flashcards.get(self.current_card_index)
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current_card_index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_card_index + 1 >= self.flashcards.len()
    }

    /// "Card 2 of 5"
    #[must_use]
    pub fn position_label(&self) -> String {
        if self.flashcards.is_empty() {
            return "No cards".to_string();
        }
        format!(
            "Card {} of {}",
            self.current_card_index + 1,
            self.flashcards.len()
        )
    }

    /// Share of the deck reached so far, 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> usize {
        if self.flashcards.is_empty() {
            return 0;
        }
        (self.current_card_index + 1) * 100 / self.flashcards.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> StudySnapshot {
        StudySnapshot {
            current_index: Some(self.current_card_index),
            is_flipped: Some(self.is_flipped),
            flashcards: Some(self.flashcards.clone()),
        }
    }

    // Transitions

    /// Advances one card and shows its front. Returns false at the end.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current_card_index += 1;
        self.is_flipped = false;
        true
    }

    /// Steps back one card and shows its front. Returns false at the start.
    pub fn prev(&mut self) -> bool {
        if self.current_card_index == 0 {
            return false;
        }
        self.current_card_index -= 1;
        self.is_flipped = false;
        true
    }

    pub fn flip(&mut self) {
        self.is_flipped = !self.is_flipped;
    }

    /// Jumps to a card and shows its front.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::IndexOutOfRange` and leaves state untouched when
    /// `index` is past the last card.
    pub fn go_to(&mut self, index: usize) -> Result<(), StudyError> {
        if index >= self.flashcards.len() {
            return Err(StudyError::IndexOutOfRange {
                index,
                len: self.flashcards.len(),
            });
        }
        self.current_card_index = index;
        self.is_flipped = false;
        Ok(())
    }

    /// Replaces the card with the same id, then restores creation order.
    /// Returns false when no card matches.
    pub fn update_card(&mut self, updated: Flashcard) -> bool {
        let Some(position) = self.position_of(updated.id) else {
            return false;
        };
        self.flashcards[position] = updated;
        sort_by_creation(&mut self.flashcards);
        true
    }

    /// Removes a card and clamps the index into the shorter list.
    /// Returns false when no card matches.
    pub fn delete_card(&mut self, id: CardId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        self.flashcards.remove(position);
        self.clamp_index();
        true
    }

    /// Applies a navigation command. `Exit` never changes state; the owner
    /// of the session decides what leaving means.
    pub fn apply(&mut self, command: StudyCommand) -> bool {
        match command {
            StudyCommand::Prev => self.prev(),
            StudyCommand::Next => self.next(),
            StudyCommand::Flip => {
                self.flip();
                true
            }
            StudyCommand::Exit => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn card(front: &str, offset_secs: i64) -> Flashcard {
        Flashcard::new(
            CardId::generate(),
            front,
            format!("{front}-back"),
            fixed_now() + Duration::seconds(offset_secs),
        )
        .unwrap()
    }

    fn deck_with(cards: Vec<Flashcard>) -> Deck {
        Deck::new(DeckId::generate(), "Spanish", None, fixed_now())
            .unwrap()
            .with_flashcards(cards)
    }

    fn session_of(n: i64) -> StudySession {
        let cards = (0..n).map(|i| card(&format!("c{i}"), i)).collect();
        StudySession::start(&deck_with(cards)).unwrap()
    }

    #[test]
    fn start_rejects_empty_deck() {
        let err = StudySession::start(&deck_with(Vec::new())).unwrap_err();
        assert_eq!(err, StudyError::EmptyDeck);
    }

    #[test]
    fn start_sorts_and_begins_unflipped() {
        let session = StudySession::start(&deck_with(vec![card("b", 5), card("a", 1)])).unwrap();
        assert_eq!(session.current_card_index(), 0);
        assert!(!session.is_flipped());
        assert_eq!(session.current_card().unwrap().front, "a");
    }

    #[test]
    fn next_and_prev_stop_at_edges() {
        let mut session = session_of(2);
        assert!(!session.prev());
        assert_eq!(session.current_card_index(), 0);
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.current_card_index(), 1);
    }

    #[test]
    fn navigation_resets_flip() {
        let mut session = session_of(3);
        session.flip();
        session.next();
        assert!(!session.is_flipped());
        session.flip();
        session.prev();
        assert!(!session.is_flipped());
    }

    #[test]
    fn flip_twice_restores_state() {
        let mut session = session_of(1);
        let before = session.clone();
        session.flip();
        session.flip();
        assert_eq!(session, before);
    }

    #[test]
    fn go_to_rejects_out_of_range_without_mutating() {
        let mut session = session_of(3);
        session.flip();
        let before = session.clone();
        let err = session.go_to(3).unwrap_err();
        assert_eq!(err, StudyError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(session, before);

        session.go_to(2).unwrap();
        assert_eq!(session.current_card_index(), 2);
        assert!(!session.is_flipped());
    }

    #[test]
    fn update_card_keeps_creation_order() {
        let mut session = session_of(3);
        let mut edited = session.flashcards()[1].clone();
        edited.front = "zzz".to_string();
        assert!(session.update_card(edited));
        assert_eq!(session.flashcards()[1].front, "zzz");
        assert!(
            session
                .flashcards()
                .windows(2)
                .all(|pair| pair[0].created_at <= pair[1].created_at)
        );
    }

    #[test]
    fn update_unknown_card_is_noop() {
        let mut session = session_of(2);
        let before = session.clone();
        assert!(!session.update_card(card("ghost", 9)));
        assert_eq!(session, before);
    }

    #[test]
    fn deleting_last_current_card_clamps_index() {
        let mut session = session_of(4);
        session.go_to(3).unwrap();
        let id = session.current_card().unwrap().id;
        assert!(session.delete_card(id));
        assert_eq!(session.current_card_index(), 2);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn deleting_only_card_leaves_empty_session() {
        let mut session = session_of(1);
        let id = session.flashcards()[0].id;
        session.delete_card(id);
        assert!(session.is_empty());
        assert_eq!(session.current_card_index(), 0);
        assert!(session.current_card().is_none());
        assert!(!session.next());
        assert!(!session.prev());
    }

    #[test]
    fn index_stays_in_bounds_across_mixed_operations() {
        let mut session = session_of(5);
        let script: [&dyn Fn(&mut StudySession); 8] = [
            &|s| {
                s.next();
            },
            &|s| {
                s.next();
            },
            &|s| {
                let _ = s.go_to(4);
            },
            &|s| {
                let id = s.current_card().unwrap().id;
                s.delete_card(id);
            },
            &|s| {
                let _ = s.go_to(10);
            },
            &|s| {
                s.prev();
            },
            &|s| {
                let id = s.flashcards()[0].id;
                s.delete_card(id);
            },
            &|s| {
                s.next();
            },
        ];
        for step in script {
            step(&mut session);
            assert!(session.current_card_index() < session.len());
        }
    }

    #[test]
    fn resume_prefers_persisted_fields_independently() {
        let deck = deck_with(vec![card("a", 1), card("b", 2), card("c", 3)]);
        let snapshot = StudySnapshot {
            current_index: Some(2),
            is_flipped: None,
            flashcards: None,
        };
        let session = StudySession::resume(&deck, snapshot, ResumePolicy::PreferPersisted).unwrap();
        assert_eq!(session.current_card_index(), 2);
        assert!(!session.is_flipped());
        assert_eq!(session.flashcards(), deck.flashcards());
    }

    #[test]
    fn resume_uses_cached_cards_over_deck() {
        let deck = deck_with(vec![card("a", 1)]);
        let cached = vec![card("x", 2), card("y", 1)];
        let snapshot = StudySnapshot {
            current_index: Some(1),
            is_flipped: Some(true),
            flashcards: Some(cached),
        };
        let session = StudySession::resume(&deck, snapshot, ResumePolicy::PreferPersisted).unwrap();
        let fronts: Vec<_> = session.flashcards().iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["y", "x"]);
        assert!(session.is_flipped());
    }

    #[test]
    fn resume_clamps_stale_index() {
        let deck = deck_with(vec![card("a", 1), card("b", 2)]);
        let snapshot = StudySnapshot {
            current_index: Some(9),
            ..StudySnapshot::default()
        };
        let session = StudySession::resume(&deck, snapshot, ResumePolicy::PreferPersisted).unwrap();
        assert_eq!(session.current_card_index(), 1);
    }

    #[test]
    fn resume_prefer_deck_follows_saved_card() {
        let a = card("a", 1);
        let b = card("b", 2);
        let c = card("c", 3);
        let deck = deck_with(vec![b.clone(), c.clone()]);
        let snapshot = StudySnapshot {
            current_index: Some(1),
            is_flipped: Some(true),
            flashcards: Some(vec![a, b.clone(), c]),
        };
        let session = StudySession::resume(&deck, snapshot, ResumePolicy::PreferDeck).unwrap();
        assert_eq!(session.current_card().unwrap().id, b.id);
        assert!(session.is_flipped());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn resume_prefer_deck_drops_flip_when_card_is_gone() {
        let deck = deck_with(vec![card("a", 1), card("b", 2)]);
        let snapshot = StudySnapshot {
            current_index: Some(0),
            is_flipped: Some(true),
            flashcards: Some(vec![card("gone", 0)]),
        };
        let session = StudySession::resume(&deck, snapshot, ResumePolicy::PreferDeck).unwrap();
        assert_eq!(session.current_card_index(), 0);
        assert!(!session.is_flipped());
    }

    #[test]
    fn resume_ignores_saved_empty_list() {
        let deck = deck_with(vec![card("a", 1)]);
        let snapshot = StudySnapshot {
            flashcards: Some(Vec::new()),
            ..StudySnapshot::default()
        };
        let session = StudySession::resume(&deck, snapshot, ResumePolicy::PreferPersisted).unwrap();
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("prefer-deck".parse::<ResumePolicy>().unwrap(), ResumePolicy::PreferDeck);
        assert_eq!(" Persisted ".parse::<ResumePolicy>().unwrap(), ResumePolicy::PreferPersisted);
        assert!("latest".parse::<ResumePolicy>().is_err());
    }

    #[test]
    fn position_label_and_progress() {
        let mut session = session_of(4);
        session.next();
        assert_eq!(session.position_label(), "Card 2 of 4");
        assert_eq!(session.progress_percent(), 50);
    }
}
