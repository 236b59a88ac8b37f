//! learning/learner.rs
//! Records outcomes and rebuilds the selection model every
//! `retrain_interval` entries.
//!
//! Concurrency:
//! - The history append and the modulo check happen under one lock, so each
//!   threshold crossing is observed by exactly one writer.
//! - That writer rebuilds outside the lock from a copy of the history prefix,
//!   so only it blocks; other callers keep appending.
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compression::{AlgorithmRegistry, CompressionResult};
use crate::config::LearnerConfig;
use crate::learning::history::{aggregate, AlgorithmStats, HistoryEntry};
use crate::profiler::{DataCharacteristics, Features};
use crate::selection::{ModelKind, RuleSet, SelectionModel, SelectionPolicy, SelectionRecommendation};
use crate::utils::{lock, unit_clamp};

/// Optional external collaborator that proposes a rule set from history.
///
/// Its answer is data: it is validated and then evaluated by the policy like
/// any other rule set. Errors and panics fall back to the local rebuild.
pub trait RuleProvider: Send + Sync {
    fn propose(&self, history: &[HistoryEntry]) -> Result<RuleSet, String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerStatistics {
    pub total_samples: usize,
    pub model_type: ModelKind,
    pub retrain_count: u64,
    pub last_trained_at: Option<DateTime<Utc>>,
    pub algorithms: BTreeMap<String, AlgorithmStats>,
}

#[derive(Default)]
struct LearnerState {
    history: Vec<HistoryEntry>,
    model: Option<SelectionModel>,
    retrain_count: u64,
    last_trained_at: Option<DateTime<Utc>>,
}

pub struct OutcomeLearner {
    policy: SelectionPolicy,
    retrain_interval: usize,
    min_training_entries: usize,
    provider: Option<Box<dyn RuleProvider>>,
    state: Mutex<LearnerState>,
}

impl OutcomeLearner {
    pub fn new(policy: SelectionPolicy, config: &LearnerConfig) -> Self {
        Self {
            policy,
            retrain_interval: config.retrain_interval.max(1),
            min_training_entries: config.min_training_entries,
            provider: None,
            state: Mutex::new(LearnerState::default()),
        }
    }

    pub fn with_provider(mut self, provider: Box<dyn RuleProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Record the outcome of one compression.
    pub fn learn(&self, characteristics: &DataCharacteristics, result: &CompressionResult) {
        self.record(HistoryEntry::from_outcome(characteristics, result));
    }

    /// Append an entry; the writer that lands on a multiple of the retrain
    /// interval rebuilds the model before returning.
    pub fn record(&self, entry: HistoryEntry) {
        let snapshot = {
            let mut state = lock(&self.state);
            state.history.push(entry);
            let len = state.history.len();
            if len % self.retrain_interval == 0 {
                Some(state.history.clone())
            } else {
                None
            }
        };

        if let Some(history) = snapshot {
            let model = self.rebuild(&history);
            self.install(model);
        }
    }

    fn install(&self, model: SelectionModel) {
        let mut state = lock(&self.state);
        // A slower rebuild of an older prefix must not replace a newer model.
        let newer = state.model.as_ref().map_or(true, |m| model.trained_on() >= m.trained_on());
        if newer {
            info!(
                model = %model.kind(),
                trained_on = model.trained_on(),
                rules = model.rules().rules.len(),
                "selection model rebuilt"
            );
            state.model = Some(model);
            state.retrain_count += 1;
            state.last_trained_at = Some(Utc::now());
        }
    }

    /// Build a model from `history`. Never fails: a collaborator error falls
    /// back to the local statistics rebuild.
    pub fn rebuild(&self, history: &[HistoryEntry]) -> SelectionModel {
        if let Some(provider) = &self.provider {
            let proposed = panic::catch_unwind(AssertUnwindSafe(|| provider.propose(history)))
                .unwrap_or_else(|_| Err("rule provider panicked".into()));
            match proposed.and_then(|mut rules| {
                rules.validate()?;
                rules.trained_on = history.len();
                rules.sort_by_specificity();
                Ok(rules)
            }) {
                Ok(rules) => return SelectionModel::RuleBased(rules),
                Err(e) => warn!(error = %e, "rule provider rejected, rebuilding from statistics"),
            }
        }
        SelectionModel::StatsDerived(self.stats_rules(history))
    }

    fn stats_rules(&self, history: &[HistoryEntry]) -> RuleSet {
        let measured: HashMap<String, f64> = aggregate(history)
            .into_iter()
            .map(|(name, stats)| (name, unit_clamp(stats.mean_ratio)))
            .collect();
        debug!(algorithms = measured.len(), entries = history.len(), "aggregating history");
        RuleSet::new(self.policy.heuristic_rules(&measured), history.len())
    }

    /// Learned recommendation, or a provisional heuristic one (confidence at
    /// most 0.5) while history or the model is missing. Rules naming a codec
    /// missing from `registry` fall through.
    pub fn predict(
        &self,
        characteristics: &DataCharacteristics,
        registry: Option<&AlgorithmRegistry>,
    ) -> SelectionRecommendation {
        let features: Features = characteristics.features();
        let available = |name: &str| registry.map_or(true, |r| r.contains(name));
        let state = lock(&self.state);
        match &state.model {
            Some(model) if state.history.len() >= self.min_training_entries => {
                self.policy.apply_learned(model, &features, available)
            }
            _ => self.policy.provisional(&features, available),
        }
    }

    pub fn current_model(&self) -> Option<SelectionModel> {
        lock(&self.state).model.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the full history, in insertion order.
    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.state).history.clone()
    }

    pub fn statistics(&self) -> LearnerStatistics {
        let state = lock(&self.state);
        LearnerStatistics {
            total_samples: state.history.len(),
            model_type: ModelKind::of(state.model.as_ref()),
            retrain_count: state.retrain_count,
            last_trained_at: state.last_trained_at,
            algorithms: aggregate(&state.history),
        }
    }

    /// Replace the history with `entries` and rebuild the model from the
    /// prefix up to the last retrain boundary.
    pub fn restore(&self, entries: Vec<HistoryEntry>) {
        let boundary = entries.len() - entries.len() % self.retrain_interval;
        let model = (boundary > 0).then(|| self.rebuild(&entries[..boundary]));

        let mut state = lock(&self.state);
        state.history = entries;
        state.retrain_count = (boundary / self.retrain_interval) as u64;
        state.last_trained_at = model.as_ref().map(|_| Utc::now());
        state.model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::profiler::{CoarseType, Structure};

    fn chars(repetition: f64) -> DataCharacteristics {
        DataCharacteristics {
            size_bytes: 20_000,
            entropy: 0.4,
            repetition,
            structure: Structure::Flat,
            coarse_type: CoarseType::Mixed,
            patterns: vec![],
        }
    }

    fn result(algorithm: &str, ratio_num: usize) -> CompressionResult {
        CompressionResult::new(algorithm, None, vec![0u8; ratio_num], 100, Duration::from_millis(3), None)
    }

    fn learner() -> OutcomeLearner {
        OutcomeLearner::new(SelectionPolicy::default(), &LearnerConfig::default())
    }

    #[test]
    fn model_appears_exactly_at_interval() {
        let l = learner();
        for _ in 0..99 {
            l.learn(&chars(0.1), &result("zstd", 20));
        }
        assert_eq!(l.statistics().model_type, ModelKind::None);
        l.learn(&chars(0.1), &result("zstd", 20));
        let stats = l.statistics();
        assert_eq!(stats.total_samples, 100);
        assert_eq!(stats.model_type, ModelKind::StatsDerived);
        assert_eq!(stats.retrain_count, 1);
    }

    #[test]
    fn rebuilt_rules_carry_measured_ratio() {
        let l = learner();
        for _ in 0..100 {
            l.learn(&chars(0.9), &result("zstd", 5));
        }
        let rec = l.predict(&chars(0.9), None);
        assert_eq!(rec.algorithm, "zstd");
        assert!((rec.expected_ratio - 0.05).abs() < 1e-9);
    }

    #[test]
    fn predict_is_provisional_before_training() {
        let l = learner();
        let rec = l.predict(&chars(0.95), None);
        assert!(rec.confidence <= 0.5);
    }

    #[test]
    fn provisional_prediction_skips_unregistered_codecs() {
        let l = learner();
        let large_repetitive = DataCharacteristics {
            size_bytes: 60_000,
            entropy: 0.1,
            repetition: 0.95,
            structure: Structure::Repetitive,
            coarse_type: CoarseType::Mixed,
            patterns: vec![],
        };
        let registry = AlgorithmRegistry::with_defaults();
        assert!(!registry.contains("quantum"));

        let rec = l.predict(&large_repetitive, Some(&registry));
        assert_eq!(rec.algorithm, "zstd");
        assert!(rec.confidence <= 0.5);
        assert_eq!(l.predict(&large_repetitive, None).algorithm, "quantum");
    }

    struct FailingProvider;
    impl RuleProvider for FailingProvider {
        fn propose(&self, _: &[HistoryEntry]) -> Result<RuleSet, String> {
            Err("offline".into())
        }
    }

    struct PanickingProvider;
    impl RuleProvider for PanickingProvider {
        fn propose(&self, _: &[HistoryEntry]) -> Result<RuleSet, String> {
            panic!("boom")
        }
    }

    #[test]
    fn provider_failures_fall_back_to_statistics() {
        for provider in [Box::new(FailingProvider) as Box<dyn RuleProvider>, Box::new(PanickingProvider)] {
            let l = learner().with_provider(provider);
            for _ in 0..100 {
                l.learn(&chars(0.1), &result("lz4", 40));
            }
            assert_eq!(l.statistics().model_type, ModelKind::StatsDerived);
        }
    }

    #[test]
    fn restore_rebuilds_from_last_boundary() {
        let l = learner();
        let entries: Vec<_> = (0..150)
            .map(|_| HistoryEntry::from_outcome(&chars(0.1), &result("zstd", 30)))
            .collect();
        l.restore(entries);
        let model = l.current_model().unwrap();
        assert_eq!(model.trained_on(), 100);
        assert_eq!(l.len(), 150);
        assert_eq!(l.statistics().retrain_count, 1);
    }

    #[test]
    fn restore_counts_every_completed_interval() {
        let l = learner();
        let entries: Vec<_> = (0..250)
            .map(|_| HistoryEntry::from_outcome(&chars(0.1), &result("zstd", 30)))
            .collect();
        l.restore(entries);
        assert_eq!(l.current_model().unwrap().trained_on(), 200);
        assert_eq!(l.statistics().retrain_count, 2);
    }
}
