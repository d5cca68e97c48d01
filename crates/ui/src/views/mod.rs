mod auth;
mod create;
mod decks;
mod home;
mod profile;
mod state;
mod study;

pub use auth::AuthView;
pub use create::CreateView;
pub use decks::DecksView;
pub use home::HomeView;
pub use profile::ProfileView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use study::StudyView;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
