//! compression/codecs/mod.rs
//! Built-in codec adapters over externally supplied compressors.
//!
//! Every adapter here round-trips exactly and is admitted to the guaranteed
//! set by `AlgorithmRegistry::with_defaults`.

pub mod deflate;
pub mod lz4;
pub mod store;
pub mod zstd;

pub use self::deflate::*;
pub use self::lz4::*;
pub use self::store::*;
pub use self::zstd::*;
