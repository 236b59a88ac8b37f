//! compression/mod.rs
//! Codec contract, framing, built-in adapters and the named registry.
//!
//! Notes:
//! - Codecs are consumed as opaque compress/decompress pairs; the adapters in
//!   `codecs/` wrap zstd, lz4_flex and flate2.
//! - Every adapter frames output with a length prefix and CRC32 trailer.
//! - `CompressionResult` is built at the boundary so ratio and checksum are
//!   never taken on trust.

pub mod constants;
pub mod types;
pub mod framing;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
