//! profiler/mod.rs
//! Derives `DataCharacteristics` from caller input.
//!
//! Every measurement runs on the canonical serialized form; the input is
//! neither mutated nor retained. Characteristics are recomputed per call.

pub mod types;
pub mod entropy;
pub mod repetition;
pub mod structure;

pub use types::*;

use crate::config::ProfilerConfig;

#[derive(Debug, Clone, Default)]
pub struct DataProfiler {
    config: ProfilerConfig,
}

impl DataProfiler {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    /// Profile an already-canonicalized payload. Infallible.
    pub fn profile(&self, input: &Canonical<'_>) -> DataCharacteristics {
        let bytes = input.as_bytes();
        let scan = &bytes[..bytes.len().min(self.config.max_scan_bytes)];

        DataCharacteristics {
            size_bytes: bytes.len() as u64,
            entropy: entropy::normalized_entropy(bytes),
            repetition: repetition::repetition_score(scan),
            structure: structure::detect_structure(input.payload),
            coarse_type: structure::detect_coarse_type(input.payload, bytes),
            patterns: repetition::repeated_substrings(scan),
        }
    }
}
