//! telemetry/counters.rs
//! Mutable counters collected by the engine.
//!
//! Summary: counts compressions by selection path, codec failures and byte
//! totals. Converted into an immutable `TelemetrySnapshot` on request.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub compressions: u64,
    /// Compressions served by the recommended codec without a benchmark.
    pub direct_selections: u64,
    pub benchmarked_selections: u64,
    pub dictionary_compressions: u64,
    pub decompressions: u64,
    /// Codec attempts that returned an error (benchmark or direct path).
    pub codec_failures: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl TelemetryCounters {
    /// Record one successful compression.
    ///
    /// - `original_len`: canonical input length
    /// - `compressed_len`: payload length of the chosen result
    pub fn add_compression(&mut self, original_len: u64, compressed_len: u64) {
        self.compressions += 1;
        self.bytes_in += original_len;
        self.bytes_out += compressed_len;
    }

    pub fn add_direct(&mut self) {
        self.direct_selections += 1;
    }

    pub fn add_benchmarked(&mut self) {
        self.benchmarked_selections += 1;
    }

    pub fn add_dictionary(&mut self) {
        self.dictionary_compressions += 1;
    }

    pub fn add_decompression(&mut self) {
        self.decompressions += 1;
    }

    pub fn add_codec_failures(&mut self, n: u64) {
        self.codec_failures += n;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        *self += other.clone();
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.compressions            += rhs.compressions;
        self.direct_selections       += rhs.direct_selections;
        self.benchmarked_selections  += rhs.benchmarked_selections;
        self.dictionary_compressions += rhs.dictionary_compressions;
        self.decompressions          += rhs.decompressions;
        self.codec_failures          += rhs.codec_failures;
        self.bytes_in                += rhs.bytes_in;
        self.bytes_out               += rhs.bytes_out;
    }
}
