//! dictionary/mod.rs
//! Pattern mining and versioned, size-capped dictionaries.

pub mod types;
pub mod miner;
pub mod builder;
pub mod store;

pub use types::*;
pub use miner::*;
pub use builder::*;
pub use store::*;
