mod deck_vm;
mod draft_rows;
mod time_fmt;

pub use deck_vm::{
    DeckCardVm, DeckOptionVm, added_flashcards_message, card_count_label, map_deck_cards,
    map_deck_options,
};
pub use draft_rows::{DraftRow, DraftRows};
pub use time_fmt::{format_date, format_long_date, format_login};
