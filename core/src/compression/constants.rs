/// Stable codec names used as registry keys and in persisted results.
pub mod codec_names {
    pub const ZSTD: &str    = "zstd";
    pub const LZ4: &str     = "lz4";
    pub const DEFLATE: &str = "deflate";
    pub const STORE: &str   = "store";
    /// Reserved for the experimental high-ratio slot. Not registered by default.
    pub const QUANTUM: &str = "quantum";
}

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_ZSTD: i32 = 6;
pub const DEFAULT_LEVEL_DEFLATE: i32 = 6;

/// Framing: u32 length prefix + u32 CRC32 trailer.
pub const FRAME_OVERHEAD: usize = 8;

/// Max input size sanity bound (u32 length prefix).
pub const MAX_INPUT_SIZE: usize = u32::MAX as usize;
