//! compression/types.rs
//! Codec contract, capability metadata, options and the boundary result type.
use std::sync::Arc;
use std::time::{Duration, Instant};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dictionary::Dictionary;
use crate::profiler::CoarseType;
use crate::utils::sha256_hex;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompressionError {
    #[error("codec {codec} init failed: {msg}")]
    CodecInitFailed { codec: String, msg: String },
    #[error("codec {codec} process failed: {msg}")]
    CodecProcessFailed { codec: String, msg: String },
    #[error("codec {codec} crc mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch { codec: String, expected: u32, actual: u32 },
    #[error("input too large: {have} > {max}")]
    InputTooLarge { have: usize, max: usize },
    #[error("codec {codec} frame truncated ({have} bytes)")]
    Truncated { codec: String, have: usize },
}

impl From<std::io::Error> for CompressionError {
    fn from(e: std::io::Error) -> Self {
        CompressionError::CodecProcessFailed { codec: "io".into(), msg: e.to_string() }
    }
}

bitflags! {
    /// Optional codec features declared in capability metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CodecFeatures: u8 {
        const DICTIONARY = 0b0000_0001;
        const LEVELS     = 0b0000_0010;
    }
}

/// Static metadata a codec declares about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmCapabilities {
    pub name: String,
    pub optimal_types: Vec<CoarseType>,
    /// Typical compressed/original ratio.
    pub average_ratio: f64,
    /// 0..=100, higher is faster.
    pub average_speed_score: f64,
    pub features: CodecFeatures,
}

impl AlgorithmCapabilities {
    pub fn supports_dictionary(&self) -> bool {
        self.features.contains(CodecFeatures::DICTIONARY)
    }
}

/// Per-call codec options.
#[derive(Debug, Clone, Default)]
pub struct CodecOptions {
    pub level: Option<i32>,
    pub dictionary: Option<Arc<Dictionary>>,
}

impl CodecOptions {
    pub fn with_level(level: i32) -> Self {
        Self { level: Some(level), dictionary: None }
    }

    pub fn with_dictionary(dictionary: Arc<Dictionary>) -> Self {
        Self { level: None, dictionary: Some(dictionary) }
    }

    pub fn dictionary_bytes(&self) -> Option<&[u8]> {
        self.dictionary.as_deref().map(|d| d.bytes.as_slice())
    }
}

/// Namespace + version of the dictionary a payload was compressed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictionaryRef {
    pub namespace: String,
    pub version: u64,
}

/// Outcome of one compression call.
///
/// `ratio` and `checksum` are always derived from `payload` and
/// `original_size` here, never taken from a codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub algorithm: String,
    pub level: Option<i32>,
    pub payload: Vec<u8>,
    pub original_size: u64,
    pub compressed_size: u64,
    pub ratio: f64,
    pub duration: Duration,
    /// Hex SHA-256 of `payload`.
    pub checksum: String,
    pub dictionary_ref: Option<DictionaryRef>,
}

impl CompressionResult {
    pub fn new(
        algorithm: impl Into<String>,
        level: Option<i32>,
        payload: Vec<u8>,
        original_size: u64,
        duration: Duration,
        dictionary_ref: Option<DictionaryRef>,
    ) -> Self {
        let compressed_size = payload.len() as u64;
        let checksum = sha256_hex(&payload);
        Self {
            algorithm: algorithm.into(),
            level,
            ratio: compute_ratio(compressed_size, original_size),
            payload,
            original_size,
            compressed_size,
            duration,
            checksum,
            dictionary_ref,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1_000.0
    }

    /// Re-derive size, ratio and checksum from the payload, discarding whatever
    /// the fields held (results may arrive deserialized from elsewhere).
    pub fn normalize(&mut self) {
        self.compressed_size = self.payload.len() as u64;
        self.ratio = compute_ratio(self.compressed_size, self.original_size);
        self.checksum = sha256_hex(&self.payload);
    }

    pub fn checksum_matches(&self) -> bool {
        sha256_hex(&self.payload) == self.checksum
    }
}

/// compressed / original. Empty input is defined as ratio 1.0.
pub fn compute_ratio(compressed_size: u64, original_size: u64) -> f64 {
    if original_size == 0 {
        1.0
    } else {
        compressed_size as f64 / original_size as f64
    }
}

/// A named compress/decompress pair.
///
/// Implementors provide the chunk functions; `compress` and `decompress`
/// wrap them into the boundary contract.
pub trait Codec: Send + Sync {
    fn capabilities(&self) -> &AlgorithmCapabilities;

    /// Compress `input` into `out`.
    fn compress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError>;

    /// Decompress one frame produced by `compress_chunk` into `out`.
    fn decompress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError>;

    fn name(&self) -> &str {
        &self.capabilities().name
    }

    fn compress(&self, data: &[u8], options: &CodecOptions) -> Result<CompressionResult, CompressionError> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(data.len() / 2 + 16);
        self.compress_chunk(data, options, &mut out)?;
        let dictionary_ref = match (&options.dictionary, self.capabilities().supports_dictionary()) {
            (Some(d), true) => Some(d.reference()),
            _ => None,
        };
        Ok(CompressionResult::new(
            self.name(),
            options.level,
            out,
            data.len() as u64,
            start.elapsed(),
            dictionary_ref,
        ))
    }

    fn decompress(&self, result: &CompressionResult, options: &CodecOptions) -> Result<Vec<u8>, CompressionError> {
        let mut out = Vec::new();
        self.decompress_chunk(&result.payload, options, &mut out)?;
        Ok(out)
    }
}
