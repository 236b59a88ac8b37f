use thiserror::Error;

use crate::compression::CompressionError;
use crate::config::ConfigError;
use crate::dictionary::DictionaryError;
use crate::learning::SnapshotError;

/// Unified engine error covering input, selection, codec, dictionary and
/// persistence failures.
/// - `#[from]` conversions let every layer propagate with `?`.
/// - Learner and miner failures never surface here; they are logged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input could not be rendered in its canonical serialized form.
    #[error("input serialization error: {0}")]
    InputSerialization(#[from] serde_json::Error),

    #[error("algorithm '{0}' is not registered")]
    AlgorithmNotFound(String),

    /// Every attempted codec failed, or none was available.
    #[error("no algorithm available ({attempted} attempted)")]
    NoAlgorithmAvailable { attempted: usize },

    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("payload checksum mismatch (expected {expected}, got {actual})")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("compression error: {0}")]
    Codec(#[from] CompressionError),

    /// Decompressed length differs from the recorded original size.
    #[error("round-trip violation: expected {expected} bytes, got {actual}")]
    RoundTripViolation { expected: u64, actual: u64 },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn is_empty_pattern_set(&self) -> bool {
        matches!(self, EngineError::Dictionary(DictionaryError::EmptyPatternSet { .. }))
    }
}
