//! src/compression/codecs/zstd.rs
//!
//! Zstd codec.
//!
//! Design notes:
//! - Uses the zstd block API (`zstd::bulk`), one standalone frame per call.
//! - A dictionary in `CodecOptions` is loaded as a raw-content dictionary; the
//!   same dictionary must be supplied on decompression.
//! - Errors are mapped into `CompressionError` variants with codec context.

use crate::compression::constants::{codec_names, DEFAULT_LEVEL_ZSTD};
use crate::compression::framing::{read_frame, verify_frame, write_frame};
use crate::compression::types::{AlgorithmCapabilities, Codec, CodecFeatures, CodecOptions, CompressionError};
use crate::profiler::CoarseType;

pub struct ZstdCodec {
    capabilities: AlgorithmCapabilities,
    default_level: i32,
}

impl ZstdCodec {
    pub fn new() -> Self {
        Self::with_level(DEFAULT_LEVEL_ZSTD)
    }

    pub fn with_level(default_level: i32) -> Self {
        Self {
            capabilities: AlgorithmCapabilities {
                name: codec_names::ZSTD.into(),
                optimal_types: vec![CoarseType::Text, CoarseType::Mixed, CoarseType::Number],
                average_ratio: 0.3,
                average_speed_score: 70.0,
                features: CodecFeatures::DICTIONARY | CodecFeatures::LEVELS,
            },
            default_level,
        }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn process_err(e: std::io::Error) -> CompressionError {
    CompressionError::CodecProcessFailed { codec: codec_names::ZSTD.into(), msg: e.to_string() }
}

fn init_err(e: std::io::Error) -> CompressionError {
    CompressionError::CodecInitFailed { codec: codec_names::ZSTD.into(), msg: e.to_string() }
}

impl Codec for ZstdCodec {
    fn capabilities(&self) -> &AlgorithmCapabilities {
        &self.capabilities
    }

    fn compress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let level = options.level.unwrap_or(self.default_level);

        let compressed = match options.dictionary_bytes() {
            Some(dict) => zstd::bulk::Compressor::with_dictionary(level, dict)
                .map_err(init_err)?
                .compress(input)
                .map_err(process_err)?,
            None => zstd::bulk::compress(input, level).map_err(process_err)?,
        };

        write_frame(input, &compressed, out)
    }

    fn decompress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let frame = read_frame(codec_names::ZSTD, input)?;

        // Decompress with known output size
        let decompressed = match options.dictionary_bytes() {
            Some(dict) => zstd::bulk::Decompressor::with_dictionary(dict)
                .map_err(init_err)?
                .decompress(frame.body, frame.original_len)
                .map_err(process_err)?,
            None => zstd::bulk::decompress(frame.body, frame.original_len).map_err(process_err)?,
        };

        verify_frame(codec_names::ZSTD, &frame, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
