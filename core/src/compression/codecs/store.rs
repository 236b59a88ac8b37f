//! codecs/store.rs
//! Pass-through codec. Wins the benchmark on incompressible input.

use crate::compression::constants::codec_names;
use crate::compression::framing::{read_frame, verify_frame, write_frame};
use crate::compression::types::{AlgorithmCapabilities, Codec, CodecFeatures, CodecOptions, CompressionError};
use crate::profiler::CoarseType;

pub struct StoreCodec {
    capabilities: AlgorithmCapabilities,
}

impl StoreCodec {
    pub fn new() -> Self {
        Self {
            capabilities: AlgorithmCapabilities {
                name: codec_names::STORE.into(),
                optimal_types: vec![CoarseType::Binary],
                average_ratio: 1.0,
                average_speed_score: 100.0,
                features: CodecFeatures::empty(),
            },
        }
    }
}

impl Default for StoreCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for StoreCodec {
    fn capabilities(&self) -> &AlgorithmCapabilities {
        &self.capabilities
    }

    fn compress_chunk(&self, input: &[u8], _options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        write_frame(input, input, out)
    }

    fn decompress_chunk(&self, input: &[u8], _options: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let frame = read_frame(codec_names::STORE, input)?;
        verify_frame(codec_names::STORE, &frame, frame.body)?;
        out.extend_from_slice(frame.body);
        Ok(())
    }
}
