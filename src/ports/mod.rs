pub mod browser;
pub mod store;
