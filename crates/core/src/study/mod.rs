//! Study-session state: card order, position, flip state, keyboard mapping,
//! and the per-device snapshot that lets a session resume.

mod keys;
mod session;
mod snapshot;

pub use keys::{EditReporter, KeyDispatcher, StudyCommand, StudyKey};
pub use session::{ResumePolicy, StudyError, StudySession};
pub use snapshot::{StudyKeys, StudySnapshot};
