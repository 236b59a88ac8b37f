//! constants.rs
//! Engine-wide thresholds, caps and defaults.
//!
//! Every configurable value in `config.rs` takes its default from here.

/// Profiler: shortest repetition/pattern window.
pub const MIN_WINDOW: usize = 4;
/// Profiler: longest repetition window.
pub const MAX_REPETITION_WINDOW: usize = 64;
/// Profiler: longest pattern window.
pub const MAX_PATTERN_WINDOW: usize = 32;
/// Profiler: patterns kept per profile.
pub const MAX_PROFILE_PATTERNS: usize = 50;
/// Profiler: repetition and pattern scans stop after this many bytes (32 KiB).
pub const DEFAULT_MAX_SCAN_BYTES: usize = 32 * 1024;

/// Selection: a learned model is only trusted after this many history entries.
pub const MIN_TRAINING_ENTRIES: usize = 10;
/// Selection: confidence strictly above this skips the benchmark.
pub const DIRECT_CONFIDENCE_THRESHOLD: f64 = 0.8;
/// Selection: provisional confidence ceiling when no model is trusted yet.
pub const PROVISIONAL_CONFIDENCE_CAP: f64 = 0.5;
/// Selection: confidence when a learned model matches nothing.
pub const UNMATCHED_CONFIDENCE: f64 = 0.3;

/// Learner: retrain on every multiple of this many history entries.
pub const RETRAIN_INTERVAL: usize = 100;

/// Benchmark scoring weights.
pub const RATIO_WEIGHT: f64 = 0.7;
pub const SPEED_WEIGHT: f64 = 0.3;
/// Benchmark: a codec taking this many milliseconds or more scores 0 for speed.
pub const SPEED_BUDGET_MS: f64 = 100.0;

/// Miner: samples buffered before an analysis pass.
pub const SAMPLE_BUFFER_SIZE: usize = 100;
/// Miner: tokens must be longer than this.
pub const MIN_TOKEN_LEN: usize = 2;
/// Miner: tokens must occur more often than this to become patterns.
pub const MIN_PATTERN_FREQUENCY: u64 = 5;
/// Miner: distinct tokens kept between passes; the least frequent go first.
pub const MAX_TRACKED_TOKENS: usize = 50_000;

/// Dictionary: hard cap, enforced unconditionally.
pub const MAX_DICTIONARY_SIZE: usize = 120_000;
/// Dictionary: packing target.
pub const TARGET_DICTIONARY_SIZE: usize = 110_000;
/// Dictionary: top patterns considered per build.
pub const MAX_DICTIONARY_PATTERNS: usize = 1_000;
/// Dictionary: synthesized training samples per build.
pub const SYNTHETIC_SAMPLE_COUNT: usize = 100;
/// Dictionary: patterns woven into each synthesized sample.
pub const PATTERNS_PER_SAMPLE: usize = 24;
/// Dictionary: shortest and longest subsequence counted across the
/// synthesized corpus. Every length in between is counted.
pub const MIN_DICTIONARY_WINDOW: usize = 4;
pub const MAX_DICTIONARY_WINDOW: usize = 64;
/// Dictionary: subsequences must occur more often than this.
pub const MIN_SUBSEQUENCE_OCCURRENCES: u32 = 2;
/// Dictionary: versions retained per namespace.
pub const DEFAULT_RETAIN_VERSIONS: usize = 5;

/// Snapshot format version for persisted learner history.
pub const HISTORY_SNAPSHOT_VERSION: u32 = 1;
