pub mod acceptance;
pub mod card;
pub mod detail_field;
pub mod listing;
