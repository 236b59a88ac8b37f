//! engine.rs
//! `CompressionEngine`: the caller-facing facade.
//!
//! Owns the registry, policy, learner, miner, dictionary store and telemetry
//! and wires them per call. All operations except codec registration take
//! `&self`, so one engine can be shared across threads.
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::benchmark::BenchmarkCoordinator;
use crate::compression::{AlgorithmRegistry, Codec, CodecOptions, CompressionResult};
use crate::config::EngineConfig;
use crate::dictionary::{Dictionary, DictionaryBuilder, DictionaryError, DictionaryStore, PatternMiner};
use crate::learning::{LearnerStatistics, OutcomeLearner, RuleProvider};
use crate::profiler::{DataCharacteristics, DataProfiler, Payload};
use crate::selection::{SelectionPolicy, SelectionRecommendation};
use crate::telemetry::{Stage, Telemetry, TelemetrySnapshot};
use crate::types::EngineError;
use crate::utils::{lock, sha256_hex};

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatistics {
    pub learner: LearnerStatistics,
    pub telemetry: TelemetrySnapshot,
    /// Registered codec names, in registration order.
    pub algorithms: Vec<String>,
    pub mined_patterns: usize,
    pub buffered_samples: usize,
    pub dictionary_namespaces: Vec<String>,
}

pub struct CompressionEngine {
    config: EngineConfig,
    registry: AlgorithmRegistry,
    policy: SelectionPolicy,
    profiler: DataProfiler,
    learner: OutcomeLearner,
    miner: PatternMiner,
    builder: DictionaryBuilder,
    dictionaries: DictionaryStore,
    telemetry: Telemetry,
}

impl CompressionEngine {
    /// Engine with default configuration and the built-in codecs.
    pub fn new() -> Self {
        let config = EngineConfig::default();
        let policy = SelectionPolicy::new(config.selection.clone(), config.learner.min_training_entries);
        Self {
            registry: AlgorithmRegistry::with_defaults(),
            profiler: DataProfiler::new(config.profiler.clone()),
            learner: OutcomeLearner::new(policy.clone(), &config.learner),
            policy,
            miner: PatternMiner::new(config.miner.clone()),
            builder: DictionaryBuilder::new(&config.dictionary),
            dictionaries: DictionaryStore::new(config.dictionary.retain_versions),
            telemetry: Telemetry::new(),
            config,
        }
    }

    /// Engine from `config`. Opens the dictionary root and loads the
    /// learner snapshot when those paths are configured and present.
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let policy = SelectionPolicy::new(config.selection.clone(), config.learner.min_training_entries);
        let dictionaries = match &config.dictionary.root {
            Some(root) => DictionaryStore::open(root, config.dictionary.retain_versions)?,
            None => DictionaryStore::new(config.dictionary.retain_versions),
        };

        let engine = Self {
            registry: AlgorithmRegistry::with_defaults(),
            profiler: DataProfiler::new(config.profiler.clone()),
            learner: OutcomeLearner::new(policy.clone(), &config.learner),
            policy,
            miner: PatternMiner::new(config.miner.clone()),
            builder: DictionaryBuilder::new(&config.dictionary),
            dictionaries,
            telemetry: Telemetry::new(),
            config,
        };

        if let Some(path) = engine.config.learner.snapshot_path.as_deref().filter(|p| p.exists()) {
            engine.learner.load_snapshot(path)?;
        }
        Ok(engine)
    }

    /// Install a retraining collaborator. Its rule sets are validated and
    /// fall back to the local rebuild on any failure.
    pub fn with_rule_provider(mut self, provider: Box<dyn RuleProvider>) -> Self {
        self.learner = self.learner.with_provider(provider);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn learner(&self) -> &OutcomeLearner {
        &self.learner
    }

    /// Add or replace a round-trip-guaranteed codec.
    pub fn register_codec(&mut self, name: impl Into<String>, codec: Arc<dyn Codec>) {
        self.registry.register(name, codec);
    }

    /// Add a codec outside the guaranteed set. It is never benchmarked and
    /// is only used when selected by name or by a heuristic naming it.
    pub fn register_experimental(&mut self, name: impl Into<String>, codec: Arc<dyn Codec>) {
        self.registry.register_experimental(name, codec);
    }

    fn coordinator(&self) -> BenchmarkCoordinator<'_> {
        BenchmarkCoordinator {
            registry: &self.registry,
            policy: &self.policy,
            learner: &self.learner,
            profiler: &self.profiler,
            telemetry: &self.telemetry,
        }
    }

    pub fn profile(&self, payload: &Payload) -> Result<DataCharacteristics, EngineError> {
        let canonical = payload.canonicalize()?;
        Ok(self.coordinator().profile(&canonical))
    }

    pub fn recommend(&self, characteristics: &DataCharacteristics) -> SelectionRecommendation {
        self.coordinator().recommend(characteristics)
    }

    /// The learner's prediction, restricted to registered codecs.
    pub fn predict(&self, characteristics: &DataCharacteristics) -> SelectionRecommendation {
        self.learner.predict(characteristics, Some(&self.registry))
    }

    /// Compress with the best codec, bounded by the configured benchmark
    /// timeout if any.
    pub fn compress_optimal(&self, payload: &Payload) -> Result<CompressionResult, EngineError> {
        let (result, _) = self.coordinator().compress_optimal(payload, self.config.benchmark.timeout())?;
        Ok(result)
    }

    /// As `compress_optimal`, with an explicit overall benchmark deadline.
    /// Codecs still running at the deadline are abandoned.
    pub fn compress_optimal_with_timeout(
        &self,
        payload: &Payload,
        timeout: Duration,
    ) -> Result<CompressionResult, EngineError> {
        let (result, _) = self.coordinator().compress_optimal(payload, Some(timeout))?;
        Ok(result)
    }

    pub fn compress_with(
        &self,
        payload: &Payload,
        algorithm: &str,
        options: &CodecOptions,
    ) -> Result<CompressionResult, EngineError> {
        let (result, _) = self.coordinator().compress_with(payload, algorithm, options)?;
        Ok(result)
    }

    /// Recover the canonical bytes of a compressed payload.
    ///
    /// Fails if the algorithm is unknown, the payload checksum does not
    /// match, a referenced dictionary version is gone, or the output length
    /// differs from `original_size`.
    pub fn decompress(&self, result: &CompressionResult) -> Result<Vec<u8>, EngineError> {
        let codec = self
            .registry
            .get(&result.algorithm)
            .ok_or_else(|| EngineError::AlgorithmNotFound(result.algorithm.clone()))?;

        let actual = sha256_hex(&result.payload);
        if actual != result.checksum {
            return Err(EngineError::ChecksumMismatch { expected: result.checksum.clone(), actual });
        }

        let options = match &result.dictionary_ref {
            Some(r) => CodecOptions::with_dictionary(self.dictionaries.get(&r.namespace, r.version)?),
            None => CodecOptions::default(),
        };

        let start = Instant::now();
        let out = codec.decompress(result, &options)?;
        self.telemetry.add_stage_time(Stage::Decompress, start.elapsed());

        if out.len() as u64 != result.original_size {
            return Err(EngineError::RoundTripViolation { expected: result.original_size, actual: out.len() as u64 });
        }
        self.telemetry.update(|c| c.add_decompression());
        Ok(out)
    }

    /// Feed a sample to the pattern miner.
    pub fn add_sample(&self, payload: &Payload) -> Result<(), EngineError> {
        let canonical = payload.canonicalize()?;
        let analyzed = self.telemetry.time(Stage::Mine, || self.miner.add_sample(canonical.as_bytes()));
        if analyzed {
            debug!(patterns = self.miner.pattern_count(), "sample buffer analyzed");
        }
        Ok(())
    }

    /// Analyze buffered samples without waiting for a full buffer.
    pub fn flush_samples(&self) {
        self.telemetry.time(Stage::Mine, || self.miner.flush());
    }

    /// Build a new dictionary version for `namespace` from the mined
    /// patterns. Builds for one namespace are serialized.
    pub fn build_dictionary(&self, namespace: &str) -> Result<Arc<Dictionary>, EngineError> {
        let build_lock = self.dictionaries.build_lock(namespace)?;
        let _guard = lock(&build_lock);

        let start = Instant::now();
        let patterns = self.miner.get_top_patterns(self.config.dictionary.max_patterns);
        let built = self.builder.build(namespace, &patterns)?;
        let dictionary = self.dictionaries.insert(
            namespace,
            built.bytes,
            built.pattern_count,
            built.training_sample_count,
        )?;
        self.telemetry.add_stage_time(Stage::DictionaryBuild, start.elapsed());

        info!(
            namespace,
            version = dictionary.version,
            size = dictionary.len(),
            patterns = dictionary.pattern_count,
            "dictionary built"
        );
        Ok(dictionary)
    }

    /// Compress against the current dictionary of `namespace` with the
    /// balanced codec, or the first guaranteed dictionary-capable codec.
    pub fn compress_with_dictionary(&self, payload: &Payload, namespace: &str) -> Result<CompressionResult, EngineError> {
        let dictionary = self
            .dictionaries
            .current(namespace)
            .ok_or_else(|| DictionaryError::NotFound { namespace: namespace.to_owned(), version: None })?;

        let balanced = &self.config.selection.balanced_algorithm;
        let (name, codec) = self
            .registry
            .guaranteed()
            .filter(|e| e.codec.capabilities().supports_dictionary())
            .min_by_key(|e| e.name != *balanced)
            .map(|e| (e.name.clone(), e.codec.clone()))
            .ok_or(EngineError::NoAlgorithmAvailable { attempted: 0 })?;

        let canonical = payload.canonicalize()?;
        let start = Instant::now();
        let mut result = codec.compress(canonical.as_bytes(), &CodecOptions::with_dictionary(dictionary))?;
        result.algorithm = name;
        self.telemetry.add_stage_time(Stage::Compress, start.elapsed());
        self.telemetry.update(|c| {
            c.add_compression(result.original_size, result.compressed_size);
            c.add_dictionary();
        });
        Ok(result)
    }

    pub fn get_dictionary_versions(&self, namespace: &str) -> Vec<u64> {
        self.dictionaries.get_dictionary_versions(namespace)
    }

    pub fn current_dictionary(&self, namespace: &str) -> Option<Arc<Dictionary>> {
        self.dictionaries.current(namespace)
    }

    pub fn get_statistics(&self) -> EngineStatistics {
        EngineStatistics {
            learner: self.learner.statistics(),
            telemetry: self.telemetry.snapshot(),
            algorithms: self.registry.list(),
            mined_patterns: self.miner.pattern_count(),
            buffered_samples: self.miner.buffered(),
            dictionary_namespaces: self.dictionaries.namespaces(),
        }
    }

    /// Write the learner history to the configured snapshot path. Returns
    /// the number of entries written, or 0 when no path is configured.
    pub fn save_history(&self) -> Result<usize, EngineError> {
        match &self.config.learner.snapshot_path {
            Some(path) => self.save_history_to(path),
            None => {
                warn!("save_history called without a configured snapshot path");
                Ok(0)
            }
        }
    }

    pub fn save_history_to(&self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        Ok(self.learner.save_snapshot(path)?)
    }

    pub fn load_history_from(&self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        Ok(self.learner.load_snapshot(path)?)
    }
}

impl Default for CompressionEngine {
    fn default() -> Self {
        Self::new()
    }
}
