//! learning/history.rs
//! Recorded outcomes and their per-algorithm aggregates.
use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compression::CompressionResult;
use crate::profiler::{DataCharacteristics, Features};

/// One observed (features, algorithm, outcome). Append-only; order matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub features: Features,
    pub algorithm: String,
    pub ratio: f64,
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_outcome(characteristics: &DataCharacteristics, result: &CompressionResult) -> Self {
        Self {
            features: characteristics.features(),
            algorithm: result.algorithm.clone(),
            ratio: result.ratio,
            duration: result.duration,
            timestamp: Utc::now(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1_000.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStats {
    pub count: u64,
    pub mean_ratio: f64,
    pub mean_duration_ms: f64,
}

/// Per-algorithm mean ratio and duration. Non-finite ratios are skipped.
pub fn aggregate(history: &[HistoryEntry]) -> BTreeMap<String, AlgorithmStats> {
    let mut sums: BTreeMap<String, (u64, f64, f64)> = BTreeMap::new();
    for entry in history.iter().filter(|e| e.ratio.is_finite()) {
        let slot = sums.entry(entry.algorithm.clone()).or_default();
        slot.0 += 1;
        slot.1 += entry.ratio;
        slot.2 += entry.duration_ms();
    }

    sums.into_iter()
        .map(|(name, (count, ratio, ms))| {
            let n = count as f64;
            (name, AlgorithmStats { count, mean_ratio: ratio / n, mean_duration_ms: ms / n })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{CoarseType, Structure};

    fn entry(algorithm: &str, ratio: f64, ms: u64) -> HistoryEntry {
        HistoryEntry {
            features: Features {
                size_bytes: 1,
                entropy: 0.0,
                repetition: 0.0,
                structure: Structure::Flat,
                coarse_type: CoarseType::Mixed,
            },
            algorithm: algorithm.into(),
            ratio,
            duration: Duration::from_millis(ms),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn means_are_per_algorithm() {
        let stats = aggregate(&[entry("zstd", 0.2, 10), entry("zstd", 0.4, 30), entry("lz4", 0.5, 2)]);
        let zstd = &stats["zstd"];
        assert_eq!(zstd.count, 2);
        assert!((zstd.mean_ratio - 0.3).abs() < 1e-9);
        assert!((zstd.mean_duration_ms - 20.0).abs() < 1e-9);
        assert_eq!(stats["lz4"].count, 1);
    }

    #[test]
    fn non_finite_ratios_are_ignored() {
        let stats = aggregate(&[entry("zstd", f64::NAN, 1), entry("zstd", 0.5, 1)]);
        assert_eq!(stats["zstd"].count, 1);
    }
}
