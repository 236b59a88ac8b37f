//! codecs/lz4.rs
//! LZ4 block codec (lz4_flex), dictionary optional.
use lz4_flex::block::{compress_with_dict, decompress_with_dict, compress, decompress};

use crate::compression::constants::codec_names;
use crate::compression::framing::{read_frame, verify_frame, write_frame};
use crate::compression::types::{AlgorithmCapabilities, Codec, CodecFeatures, CodecOptions, CompressionError};
use crate::profiler::CoarseType;

/// LZ4 codec using the lz4_flex block API.
/// Block mode has no levels; `CodecOptions::level` is ignored.
pub struct Lz4Codec {
    capabilities: AlgorithmCapabilities,
}

impl Lz4Codec {
    pub fn new() -> Self {
        Self {
            capabilities: AlgorithmCapabilities {
                name: codec_names::LZ4.into(),
                optimal_types: vec![CoarseType::Binary, CoarseType::Mixed],
                average_ratio: 0.5,
                average_speed_score: 95.0,
                features: CodecFeatures::DICTIONARY,
            },
        }
    }
}

impl Default for Lz4Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for Lz4Codec {
    fn capabilities(&self) -> &AlgorithmCapabilities {
        &self.capabilities
    }

    fn compress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = match options.dictionary_bytes() {
            Some(dict) => compress_with_dict(input, dict),
            None => compress(input),
        };
        write_frame(input, &compressed, out)
    }

    fn decompress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let frame = read_frame(codec_names::LZ4, input)?;

        let decompressed = match options.dictionary_bytes() {
            Some(dict) => decompress_with_dict(frame.body, frame.original_len, dict),
            None => decompress(frame.body, frame.original_len),
        }
        .map_err(|e| CompressionError::CodecProcessFailed {
            codec: codec_names::LZ4.into(),
            msg: e.to_string(),
        })?;

        verify_frame(codec_names::LZ4, &frame, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
