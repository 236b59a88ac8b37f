//! telemetry/snapshot.rs
//! Immutable telemetry snapshot.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compression::compute_ratio;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

/// Counters, aggregate ratio, stage timings and uptime at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    /// bytes_out / bytes_in over every compression so far; 1.0 before any.
    pub compression_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_in as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            compression_ratio: compute_ratio(counters.bytes_out, counters.bytes_in),
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Every compression was served directly, by a benchmark or with a
    /// dictionary. Stage times sum across threads, so they may exceed uptime.
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        c.direct_selections + c.benchmarked_selections + c.dictionary_compressions >= c.compressions
    }
}
