//! Deflate (zlib wrapper) via flate2.

use std::io::Read;
use std::io::Write;
use flate2::{Compression, write::ZlibEncoder, read::ZlibDecoder};

use crate::compression::constants::{codec_names, DEFAULT_LEVEL_DEFLATE};
use crate::compression::framing::{read_frame, verify_frame, write_frame};
use crate::compression::types::{AlgorithmCapabilities, Codec, CodecFeatures, CodecOptions, CompressionError};
use crate::profiler::CoarseType;

pub struct DeflateCodec {
    capabilities: AlgorithmCapabilities,
}

impl DeflateCodec {
    pub fn new() -> Self {
        Self {
            capabilities: AlgorithmCapabilities {
                name: codec_names::DEFLATE.into(),
                optimal_types: vec![CoarseType::Text],
                average_ratio: 0.35,
                average_speed_score: 55.0,
                features: CodecFeatures::LEVELS,
            },
        }
    }

    fn level(options: &CodecOptions) -> Compression {
        match options.level.unwrap_or(DEFAULT_LEVEL_DEFLATE) {
            lvl @ 0..=9 => Compression::new(lvl as u32),
            _ => Compression::default(),
        }
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn process_err(e: std::io::Error) -> CompressionError {
    CompressionError::CodecProcessFailed { codec: codec_names::DEFLATE.into(), msg: e.to_string() }
}

impl Codec for DeflateCodec {
    fn capabilities(&self) -> &AlgorithmCapabilities {
        &self.capabilities
    }

    fn compress_chunk(&self, input: &[u8], options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Every call is its own zlib stream; dictionaries are not used.
        let mut enc = ZlibEncoder::new(Vec::new(), Self::level(options));
        enc.write_all(input).map_err(process_err)?;
        let compressed = enc.finish().map_err(process_err)?;

        write_frame(input, &compressed, out)
    }

    fn decompress_chunk(&self, input: &[u8], _options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let frame = read_frame(codec_names::DEFLATE, input)?;

        let mut dec = ZlibDecoder::new(frame.body);
        let mut decompressed = Vec::with_capacity(frame.original_len.min(frame.body.len().saturating_mul(16)));
        dec.read_to_end(&mut decompressed).map_err(process_err)?;

        verify_frame(codec_names::DEFLATE, &frame, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
