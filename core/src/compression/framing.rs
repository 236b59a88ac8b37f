//! compression/framing.rs
//! Shared frame layout for every built-in codec:
//!
//! ```text
//! [u32 LE original length][codec body][u32 LE CRC32 of original]
//! ```
//!
//! The length prefix lets block decoders size their output; the trailer
//! catches a codec that decodes without error but to the wrong bytes.

use crate::compression::constants::{FRAME_OVERHEAD, MAX_INPUT_SIZE};
use crate::compression::types::CompressionError;
use crate::utils::compute_checksum;

/// Borrowed view of a parsed frame.
pub struct Frame<'a> {
    pub original_len: usize,
    pub body: &'a [u8],
    pub expected_crc: u32,
}

/// Append a complete frame (prefix, body, trailer) to `out`.
pub fn write_frame(original: &[u8], body: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
    if original.len() > MAX_INPUT_SIZE {
        return Err(CompressionError::InputTooLarge { have: original.len(), max: MAX_INPUT_SIZE });
    }
    out.reserve(body.len() + FRAME_OVERHEAD);
    out.extend_from_slice(&(original.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&compute_checksum(original).to_le_bytes());
    Ok(())
}

/// Split a frame into prefix, body and trailer.
pub fn read_frame<'a>(codec: &str, input: &'a [u8]) -> Result<Frame<'a>, CompressionError> {
    if input.len() < FRAME_OVERHEAD {
        return Err(CompressionError::Truncated { codec: codec.into(), have: input.len() });
    }
    let (prefix, rest) = input.split_at(4);
    let (body, trailer) = rest.split_at(rest.len() - 4);

    Ok(Frame {
        original_len: u32::from_le_bytes(to_array(prefix)) as usize,
        body,
        expected_crc: u32::from_le_bytes(to_array(trailer)),
    })
}

/// Check decoded output against the frame's length prefix and CRC trailer.
pub fn verify_frame(codec: &str, frame: &Frame<'_>, decoded: &[u8]) -> Result<(), CompressionError> {
    if decoded.len() != frame.original_len {
        return Err(CompressionError::CodecProcessFailed {
            codec: codec.into(),
            msg: format!("decoded size {} != prefix {}", decoded.len(), frame.original_len),
        });
    }
    let actual = compute_checksum(decoded);
    if actual != frame.expected_crc {
        return Err(CompressionError::ChecksumMismatch {
            codec: codec.into(),
            expected: frame.expected_crc,
            actual,
        });
    }
    Ok(())
}

fn to_array(bytes: &[u8]) -> [u8; 4] {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(&bytes[..4]);
    arr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips_through_reader() {
        let mut out = Vec::new();
        write_frame(b"hello", b"BODY", &mut out).unwrap();
        let frame = read_frame("t", &out).unwrap();
        assert_eq!(frame.original_len, 5);
        assert_eq!(frame.body, b"BODY");
        assert!(verify_frame("t", &frame, b"hello").is_ok());
    }

    #[test]
    fn short_input_is_truncated() {
        assert!(matches!(read_frame("t", &[1, 2, 3]), Err(CompressionError::Truncated { .. })));
    }

    #[test]
    fn wrong_bytes_fail_crc() {
        let mut out = Vec::new();
        write_frame(b"hello", b"", &mut out).unwrap();
        let frame = read_frame("t", &out).unwrap();
        assert!(matches!(
            verify_frame("t", &frame, b"jello"),
            Err(CompressionError::ChecksumMismatch { .. })
        ));
    }
}
