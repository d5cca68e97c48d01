use std::sync::Arc;

use kard_core::model::{CardId, Deck, DeckId, Flashcard};
use kard_core::study::{
    KeyDispatcher, ResumePolicy, StudyCommand, StudyError, StudyKey, StudyKeys, StudySession,
    StudySnapshot,
};
use storage::local::LocalStore;

/// What the caller should do after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyOutcome {
    /// The key was not bound or dispatch is suspended.
    Ignored,
    /// State changed (or the command was a no-op at an edge).
    Applied(StudyCommand),
    /// The user asked to leave; call [`StudyController::exit`].
    ExitRequested,
}

/// Owns a [`StudySession`] and mirrors it to the device's local store.
///
/// Every mutation rewrites all three keys. A failed write is logged and the
/// in-memory session keeps going.
pub struct StudyController {
    session: StudySession,
    keys: StudyKeys,
    store: Arc<dyn LocalStore>,
}

impl StudyController {
    /// Start or resume studying `deck` on this device.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::EmptyDeck` when there is nothing to show.
    pub fn open(
        deck: &Deck,
        store: Arc<dyn LocalStore>,
        policy: ResumePolicy,
    ) -> Result<Self, StudyError> {
        let keys = StudyKeys::for_deck(deck.id());
        let snapshot = read_snapshot(store.as_ref(), &keys);
        let resumed = !snapshot.is_empty();
        let session = StudySession::resume(deck, snapshot, policy)?;
        tracing::debug!(
            deck_id = %deck.id(),
            resumed,
            %policy,
            index = session.current_card_index(),
            "study session opened"
        );

        let controller = Self {
            session,
            keys,
            store,
        };
        controller.persist();
        Ok(controller)
    }

    #[must_use]
    pub fn session(&self) -> &StudySession {
        &self.session
    }

    #[must_use]
    pub fn deck_id(&self) -> DeckId {
        self.session.deck_id()
    }

    pub fn next(&mut self) -> bool {
        let moved = self.session.next();
        self.persist();
        moved
    }

    pub fn prev(&mut self) -> bool {
        let moved = self.session.prev();
        self.persist();
        moved
    }

    pub fn flip(&mut self) {
        self.session.flip();
        self.persist();
    }

    /// # Errors
    ///
    /// Returns `StudyError::IndexOutOfRange` and leaves state untouched.
    pub fn go_to(&mut self, index: usize) -> Result<(), StudyError> {
        self.session.go_to(index)?;
        self.persist();
        Ok(())
    }

    pub fn update_card(&mut self, card: Flashcard) -> bool {
        let found = self.session.update_card(card);
        self.persist();
        found
    }

    pub fn delete_card(&mut self, id: CardId) -> bool {
        let found = self.session.delete_card(id);
        self.persist();
        found
    }

    pub fn apply(&mut self, command: StudyCommand) -> StudyOutcome {
        match command {
            StudyCommand::Prev => {
                self.prev();
            }
            StudyCommand::Next => {
                self.next();
            }
            StudyCommand::Flip => self.flip(),
            StudyCommand::Exit => return StudyOutcome::ExitRequested,
        }
        StudyOutcome::Applied(command)
    }

    /// Routes a key press through the dispatcher.
    pub fn handle_key(&mut self, key: StudyKey, dispatcher: &KeyDispatcher) -> StudyOutcome {
        match dispatcher.dispatch(key) {
            Some(command) => self.apply(command),
            None => StudyOutcome::Ignored,
        }
    }

    /// Forget this deck's session on the device and hand back the deck id.
    pub fn exit(self) -> DeckId {
        for key in self.keys.all() {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear study state");
            }
        }
        tracing::debug!(deck_id = %self.session.deck_id(), "study session closed");
        self.session.deck_id()
    }

    fn persist(&self) {
        let session = &self.session;
        self.write(
            self.keys.current_index(),
            StudySnapshot::encode_index(session.current_card_index()),
        );
        self.write(
            self.keys.is_flipped(),
            StudySnapshot::encode_flipped(session.is_flipped()),
        );
        match StudySnapshot::encode_flashcards(session.flashcards()) {
            Ok(raw) => self.write(self.keys.flashcards(), raw),
            Err(e) => tracing::warn!(error = %e, "failed to encode study flashcards"),
        }
    }

    fn write(&self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, &value) {
            tracing::warn!(key, error = %e, "failed to persist study state");
        }
    }
}

fn read_raw(store: &dyn LocalStore, key: &str) -> Option<String> {
    store
        .get(key)
        .inspect_err(|e| tracing::warn!(key, error = %e, "failed to read study state"))
        .ok()
        .flatten()
}

fn parse_or_warn<T>(key: &str, raw: Option<String>, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(key, "ignoring unreadable study state");
    }
    parsed
}

fn read_snapshot(store: &dyn LocalStore, keys: &StudyKeys) -> StudySnapshot {
    StudySnapshot {
        current_index: parse_or_warn(
            keys.current_index(),
            read_raw(store, keys.current_index()),
            StudySnapshot::parse_index,
        ),
        is_flipped: parse_or_warn(
            keys.is_flipped(),
            read_raw(store, keys.is_flipped()),
            StudySnapshot::parse_flipped,
        ),
        flashcards: parse_or_warn(
            keys.flashcards(),
            read_raw(store, keys.flashcards()),
            StudySnapshot::parse_flashcards,
        ),
    }
}
