//! config.rs
//! Engine configuration. Every field defaults from `constants.rs`; a JSON
//! file only needs the fields it overrides.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::codec_names;
use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub profiler: ProfilerConfig,
    pub selection: SelectionConfig,
    pub benchmark: BenchmarkConfig,
    pub learner: LearnerConfig,
    pub miner: MinerConfig,
    pub dictionary: DictionaryConfig,
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.learner.retrain_interval == 0 {
            return Err(ConfigError::Invalid("learner.retrain_interval must be > 0".into()));
        }
        if self.miner.buffer_size == 0 {
            return Err(ConfigError::Invalid("miner.buffer_size must be > 0".into()));
        }
        if self.miner.max_tracked_tokens == 0 {
            return Err(ConfigError::Invalid("miner.max_tracked_tokens must be > 0".into()));
        }
        if self.dictionary.retain_versions == 0 {
            return Err(ConfigError::Invalid("dictionary.retain_versions must be >= 1".into()));
        }
        if self.dictionary.target_size > MAX_DICTIONARY_SIZE {
            return Err(ConfigError::Invalid(format!(
                "dictionary.target_size {} exceeds cap {}",
                self.dictionary.target_size, MAX_DICTIONARY_SIZE
            )));
        }
        let t = self.selection.direct_confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::Invalid(format!("selection.direct_confidence_threshold {} not in [0,1]", t)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    pub max_scan_bytes: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self { max_scan_bytes: DEFAULT_MAX_SCAN_BYTES }
    }
}

/// Which registered codec stands for each heuristic class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub high_ratio_algorithm: String,
    pub repetition_algorithm: String,
    pub text_algorithm: String,
    pub speed_algorithm: String,
    pub balanced_algorithm: String,
    pub direct_confidence_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            high_ratio_algorithm: codec_names::QUANTUM.into(),
            repetition_algorithm: codec_names::ZSTD.into(),
            text_algorithm: codec_names::DEFLATE.into(),
            speed_algorithm: codec_names::LZ4.into(),
            balanced_algorithm: codec_names::ZSTD.into(),
            direct_confidence_threshold: DIRECT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Overall deadline for a benchmark fan-out. `None` waits for every codec.
    pub timeout_ms: Option<u64>,
}

impl BenchmarkConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub retrain_interval: usize,
    pub min_training_entries: usize,
    /// Snapshot file loaded at engine start and written by `save_history`.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            retrain_interval: RETRAIN_INTERVAL,
            min_training_entries: MIN_TRAINING_ENTRIES,
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub buffer_size: usize,
    pub min_token_len: usize,
    pub min_frequency: u64,
    pub max_tracked_tokens: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            buffer_size: SAMPLE_BUFFER_SIZE,
            min_token_len: MIN_TOKEN_LEN,
            min_frequency: MIN_PATTERN_FREQUENCY,
            max_tracked_tokens: MAX_TRACKED_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// On-disk root. `None` keeps dictionaries in memory only.
    pub root: Option<PathBuf>,
    pub retain_versions: usize,
    pub target_size: usize,
    pub max_patterns: usize,
    pub synthetic_samples: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            root: None,
            retain_versions: DEFAULT_RETAIN_VERSIONS,
            target_size: TARGET_DICTIONARY_SIZE,
            max_patterns: MAX_DICTIONARY_PATTERNS,
            synthetic_samples: SYNTHETIC_SAMPLE_COUNT,
        }
    }
}
