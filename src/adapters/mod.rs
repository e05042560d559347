#[cfg(feature = "chrome")]
pub mod chrome;
pub mod html;
pub mod store;
