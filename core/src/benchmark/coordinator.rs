//! benchmark/coordinator.rs
//! Profile, recommend, then compress directly or benchmark every guaranteed
//! codec. The chosen outcome is always fed back to the learner.
//!
//! Degradation:
//! - A direct compression that fails falls back to a benchmark over the
//!   remaining guaranteed codecs.
//! - A benchmark fails only when no attempt succeeds.
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::benchmark::scoring::{select_winner, Candidate};
use crate::benchmark::worker::{fan_out, fan_out_with_deadline, run_attempt, Job};
use crate::compression::{AlgorithmRegistry, CodecOptions, CompressionError, CompressionResult};
use crate::learning::OutcomeLearner;
use crate::profiler::{Canonical, DataCharacteristics, DataProfiler, Payload};
use crate::selection::{SelectionPolicy, SelectionRecommendation};
use crate::telemetry::{Stage, Telemetry};
use crate::types::EngineError;

/// How the returned result was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPath {
    Direct,
    Benchmarked,
}

pub struct BenchmarkCoordinator<'a> {
    pub registry: &'a AlgorithmRegistry,
    pub policy: &'a SelectionPolicy,
    pub learner: &'a OutcomeLearner,
    pub profiler: &'a DataProfiler,
    pub telemetry: &'a Telemetry,
}

impl<'a> BenchmarkCoordinator<'a> {
    pub fn profile(&self, canonical: &Canonical<'_>) -> DataCharacteristics {
        self.telemetry.time(Stage::Profile, || self.profiler.profile(canonical))
    }

    pub fn recommend(&self, characteristics: &DataCharacteristics) -> SelectionRecommendation {
        self.telemetry.time(Stage::Select, || {
            let model = self.learner.current_model();
            self.policy.recommend(characteristics, model.as_ref(), Some(self.registry))
        })
    }

    /// Compress with the best codec for `payload`.
    ///
    /// Confidence above the direct threshold compresses with the recommended
    /// codec; anything else benchmarks. `timeout` bounds the benchmark.
    pub fn compress_optimal(
        &self,
        payload: &Payload,
        timeout: Option<Duration>,
    ) -> Result<(CompressionResult, SelectionPath), EngineError> {
        let canonical = payload.canonicalize()?;
        let data = canonical.as_bytes();
        let characteristics = self.profile(&canonical);
        let rec = self.recommend(&characteristics);

        let mut exclude = None;
        if rec.confidence > self.policy.config().direct_confidence_threshold {
            match self.job(&rec.algorithm) {
                Some(job) => {
                    let attempt = self.attempt(&job, data, &CodecOptions::default());
                    match attempt {
                        Ok(result) => {
                            debug!(algorithm = %result.algorithm, ratio = result.ratio, "direct compression");
                            self.finish(&characteristics, &result, SelectionPath::Direct);
                            return Ok((result, SelectionPath::Direct));
                        }
                        Err(e) => {
                            warn!(algorithm = %rec.algorithm, error = %e, "direct compression failed, benchmarking");
                            self.telemetry.update(|c| c.add_codec_failures(1));
                            exclude = Some(rec.algorithm.as_str());
                        }
                    }
                }
                None => warn!(algorithm = %rec.algorithm, "recommended codec not registered, benchmarking"),
            }
        }

        let result = self.benchmark(data, exclude, timeout)?;
        self.finish(&characteristics, &result, SelectionPath::Benchmarked);
        Ok((result, SelectionPath::Benchmarked))
    }

    /// Compress with a named codec. Unknown names fail; a codec error
    /// degrades to a benchmark over the other guaranteed codecs.
    pub fn compress_with(
        &self,
        payload: &Payload,
        algorithm: &str,
        options: &CodecOptions,
    ) -> Result<(CompressionResult, SelectionPath), EngineError> {
        let job = self.job(algorithm).ok_or_else(|| EngineError::AlgorithmNotFound(algorithm.to_owned()))?;
        let canonical = payload.canonicalize()?;
        let data = canonical.as_bytes();
        let characteristics = self.profile(&canonical);

        let (result, path) = match self.attempt(&job, data, options) {
            Ok(result) => (result, SelectionPath::Direct),
            Err(e) => {
                warn!(algorithm, error = %e, "requested codec failed, benchmarking");
                self.telemetry.update(|c| c.add_codec_failures(1));
                (self.benchmark(data, Some(algorithm), None)?, SelectionPath::Benchmarked)
            }
        };
        self.finish(&characteristics, &result, path);
        Ok((result, path))
    }

    /// Run every guaranteed codec except `exclude` and return the best
    /// scoring result.
    pub fn benchmark(
        &self,
        data: &[u8],
        exclude: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<CompressionResult, EngineError> {
        let jobs: Vec<Job> = self
            .registry
            .guaranteed()
            .filter(|e| Some(e.name.as_str()) != exclude)
            .filter_map(|e| self.job(&e.name))
            .collect();
        if jobs.is_empty() {
            return Err(EngineError::NoAlgorithmAvailable { attempted: 0 });
        }

        let start = Instant::now();
        let gathered = match timeout {
            Some(t) => fan_out_with_deadline(&jobs, Arc::from(data), t),
            None => fan_out(&jobs, data),
        };
        self.telemetry.add_stage_time(Stage::Benchmark, start.elapsed());

        let mut failures = 0u64;
        let candidates: Vec<Candidate> = gathered
            .attempts
            .into_iter()
            .filter_map(|a| match a.outcome {
                Ok(result) => Some(Candidate { position: a.position, result }),
                Err(_) => {
                    failures += 1;
                    None
                }
            })
            .collect();
        self.telemetry.update(|c| c.add_codec_failures(failures));

        let winner = select_winner(candidates).ok_or(EngineError::NoAlgorithmAvailable { attempted: jobs.len() })?;
        info!(
            winner = %winner.result.algorithm,
            ratio = winner.result.ratio,
            attempted = jobs.len(),
            failed = failures,
            timed_out = gathered.timed_out,
            "benchmark complete"
        );
        Ok(winner.result)
    }

    fn job(&self, name: &str) -> Option<Job> {
        Some(Job {
            position: self.registry.position(name)?,
            name: name.to_owned(),
            codec: self.registry.get(name)?,
        })
    }

    fn attempt(&self, job: &Job, data: &[u8], options: &CodecOptions) -> Result<CompressionResult, CompressionError> {
        let start = Instant::now();
        let attempt = run_attempt(job, data, options);
        self.telemetry.add_stage_time(Stage::Compress, start.elapsed());
        attempt.outcome
    }

    fn finish(&self, characteristics: &DataCharacteristics, result: &CompressionResult, path: SelectionPath) {
        self.telemetry.update(|c| {
            c.add_compression(result.original_size, result.compressed_size);
            match path {
                SelectionPath::Direct => c.add_direct(),
                SelectionPath::Benchmarked => c.add_benchmarked(),
            }
        });
        self.telemetry.time(Stage::Learn, || self.learner.learn(characteristics, result));
    }
}
