mod card_list;
mod keys;
mod view;

pub use view::StudyView;
