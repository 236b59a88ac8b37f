//! compress-core
//!
//! Adaptive multi-algorithm compression engine: profiles input, selects or
//! benchmarks codecs, learns from outcomes and mines versioned dictionaries.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod types;
pub mod utils;

// Pipeline layers
pub mod compression;
pub mod profiler;
pub mod selection;
pub mod benchmark;
pub mod learning;
pub mod dictionary;
pub mod telemetry;

pub mod engine;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{AlgorithmRegistry, Codec, CodecOptions, CompressionResult};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{CompressionEngine, EngineStatistics};
    pub use crate::profiler::{DataCharacteristics, Payload};
    pub use crate::selection::SelectionRecommendation;
    pub use crate::types::EngineError;
}
