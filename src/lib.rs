pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod ports;
pub mod traversal;

#[cfg(test)]
pub mod test_helpers;
