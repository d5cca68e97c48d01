use std::collections::BTreeSet;

use crate::model::CardId;

/// Keys the study view reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyKey {
    ArrowLeft,
    ArrowRight,
    Space,
    Enter,
    Escape,
    Other,
}

impl StudyKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            " " | "Spacebar" => Self::Space,
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyCommand {
    Prev,
    Next,
    Flip,
    Exit,
}

impl StudyCommand {
    #[must_use]
    pub fn for_key(key: StudyKey) -> Option<Self> {
        match key {
            StudyKey::ArrowLeft => Some(Self::Prev),
            StudyKey::ArrowRight => Some(Self::Next),
            StudyKey::Space | StudyKey::Enter => Some(Self::Flip),
            StudyKey::Escape => Some(Self::Exit),
            StudyKey::Other => None,
        }
    }
}

/// Capability handed to inline editors so they can announce when they open
/// and close.
pub trait EditReporter {
    fn report_editing(&mut self, source: CardId, editing: bool);
}

/// Turns key presses into study commands unless an inline editor is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDispatcher {
    open_editors: BTreeSet<CardId>,
}

impl KeyDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        !self.open_editors.is_empty()
    }

    /// `None` means the key should fall through to its default behaviour.
    #[must_use]
    pub fn dispatch(&self, key: StudyKey) -> Option<StudyCommand> {
        if self.is_suspended() {
            return None;
        }
        StudyCommand::for_key(key)
    }

    /// Drops editor state for a card that no longer exists.
    pub fn forget(&mut self, source: CardId) {
        self.open_editors.remove(&source);
    }
}

impl EditReporter for KeyDispatcher {
    fn report_editing(&mut self, source: CardId, editing: bool) {
        if editing {
            self.open_editors.insert(source);
        } else {
            self.open_editors.remove(&source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_dom_key_names() {
        assert_eq!(StudyKey::from_key_name(" "), StudyKey::Space);
        assert_eq!(StudyKey::from_key_name("ArrowLeft"), StudyKey::ArrowLeft);
        assert_eq!(StudyKey::from_key_name("a"), StudyKey::Other);
    }

    #[test]
    fn dispatches_bindings_when_idle() {
        let dispatcher = KeyDispatcher::new();
        assert_eq!(dispatcher.dispatch(StudyKey::ArrowLeft), Some(StudyCommand::Prev));
        assert_eq!(dispatcher.dispatch(StudyKey::ArrowRight), Some(StudyCommand::Next));
        assert_eq!(dispatcher.dispatch(StudyKey::Space), Some(StudyCommand::Flip));
        assert_eq!(dispatcher.dispatch(StudyKey::Enter), Some(StudyCommand::Flip));
        assert_eq!(dispatcher.dispatch(StudyKey::Escape), Some(StudyCommand::Exit));
        assert_eq!(dispatcher.dispatch(StudyKey::Other), None);
    }

    #[test]
    fn suspends_until_every_editor_closes() {
        let first = CardId::generate();
        let second = CardId::generate();
        let mut dispatcher = KeyDispatcher::new();

        dispatcher.report_editing(first, true);
        dispatcher.report_editing(second, true);
        assert_eq!(dispatcher.dispatch(StudyKey::Space), None);

        dispatcher.report_editing(first, false);
        assert!(dispatcher.is_suspended());

        dispatcher.forget(second);
        assert_eq!(dispatcher.dispatch(StudyKey::Space), Some(StudyCommand::Flip));
    }
}
