//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::utils::lock;

#[derive(Default)]
struct TelemetryState {
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

/// Shared telemetry sink. Every update takes one short lock.
#[derive(Default)]
pub struct Telemetry {
    state: Mutex<TelemetryState>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, f: impl FnOnce(&mut TelemetryCounters)) {
        f(&mut lock(&self.state).counters);
    }

    pub fn add_stage_time(&self, stage: Stage, dur: Duration) {
        lock(&self.state).timer.add_stage_time(stage, dur);
    }

    /// Run `f`, charging its wall time to `stage`.
    pub fn time<T>(&self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.add_stage_time(stage, start.elapsed());
        out
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let state = lock(&self.state);
        TelemetrySnapshot::from(&state.counters, &state.timer)
    }
}
