use dioxus::prelude::Key;
use kard_core::study::StudyKey;

/// Maps a Dioxus key value onto the study key set.
#[must_use]
pub fn study_key(key: &Key) -> StudyKey {
    match key {
        Key::ArrowLeft => StudyKey::ArrowLeft,
        Key::ArrowRight => StudyKey::ArrowRight,
        Key::Enter => StudyKey::Enter,
        Key::Escape => StudyKey::Escape,
        Key::Character(value) => StudyKey::from_key_name(value),
        _ => StudyKey::Other,
    }
}
