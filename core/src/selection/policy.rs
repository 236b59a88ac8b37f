//! selection/policy.rs
//! Maps characteristics to a recommendation through a learned model or the
//! fixed heuristics.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compression::AlgorithmRegistry;
use crate::config::SelectionConfig;
use crate::constants::{MIN_TRAINING_ENTRIES, PROVISIONAL_CONFIDENCE_CAP, UNMATCHED_CONFIDENCE};
use crate::profiler::{CoarseType, DataCharacteristics, Features, Structure};
use crate::selection::model::SelectionModel;
use crate::selection::rules::{Condition, RuleSet, SelectionRule};

/// Heuristic class constants: (confidence, expected_ratio).
pub const HIGH_RATIO_CLASS: (f64, f64) = (0.75, 0.08);
pub const REPETITION_CLASS: (f64, f64) = (0.85, 0.12);
pub const TEXT_CLASS: (f64, f64) = (0.78, 0.22);
pub const SPEED_CLASS: (f64, f64) = (0.65, 0.55);
pub const BALANCED_CLASS: (f64, f64) = (0.55, 0.35);

const HIGH_RATIO_MIN_SIZE: u64 = 50_000;
const REPETITION_THRESHOLD: f64 = 0.8;
const TEXT_MIN_SIZE: u64 = 5_000;
const SPEED_MAX_SIZE: u64 = 1_000;
const SPEED_MIN_ENTROPY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Heuristic,
    /// Heuristic answer while the learner has too little history.
    Provisional,
    Learned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecommendation {
    pub algorithm: String,
    pub confidence: f64,
    pub expected_ratio: f64,
    pub reason: String,
    pub source: RecommendationSource,
}

impl SelectionRecommendation {
    fn from_rule(rule: &SelectionRule, source: RecommendationSource) -> Self {
        Self {
            algorithm: rule.algorithm.clone(),
            confidence: rule.confidence,
            expected_ratio: rule.expected_ratio,
            reason: rule.reason.clone(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    config: SelectionConfig,
    min_training_entries: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new(SelectionConfig::default(), MIN_TRAINING_ENTRIES)
    }
}

impl SelectionPolicy {
    pub fn new(config: SelectionConfig, min_training_entries: usize) -> Self {
        Self { config, min_training_entries }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// The five fixed heuristics in evaluation order. `measured` replaces the
    /// expected ratio of any algorithm it has a mean for.
    pub fn heuristic_rules(&self, measured: &HashMap<String, f64>) -> Vec<SelectionRule> {
        let c = &self.config;
        let make = |condition, algorithm: &str, (confidence, ratio): (f64, f64), reason: &str| SelectionRule {
            condition,
            algorithm: algorithm.to_owned(),
            confidence,
            expected_ratio: measured.get(algorithm).copied().unwrap_or(ratio),
            reason: reason.to_owned(),
        };

        vec![
            make(
                Condition::All(vec![
                    Condition::RepetitionAbove(REPETITION_THRESHOLD),
                    Condition::SizeAbove(HIGH_RATIO_MIN_SIZE),
                    Condition::StructureIs(Structure::Repetitive),
                ]),
                &c.high_ratio_algorithm,
                HIGH_RATIO_CLASS,
                "large highly repetitive structure: high-ratio codec",
            ),
            make(
                Condition::RepetitionAbove(REPETITION_THRESHOLD),
                &c.repetition_algorithm,
                REPETITION_CLASS,
                "high repetition: repetition-optimized codec",
            ),
            make(
                Condition::All(vec![
                    Condition::TypeIs(CoarseType::Text),
                    Condition::SizeAbove(TEXT_MIN_SIZE),
                ]),
                &c.text_algorithm,
                TEXT_CLASS,
                "sizeable text: text-optimized codec",
            ),
            make(
                Condition::Any(vec![
                    Condition::SizeBelow(SPEED_MAX_SIZE),
                    Condition::EntropyAbove(SPEED_MIN_ENTROPY),
                ]),
                &c.speed_algorithm,
                SPEED_CLASS,
                "small or high-entropy input: speed-optimized codec",
            ),
            make(Condition::Always, &c.balanced_algorithm, BALANCED_CLASS, "default: balanced codec"),
        ]
    }

    pub fn heuristic_rule_set(&self) -> RuleSet {
        RuleSet::new(self.heuristic_rules(&HashMap::new()), 0)
    }

    /// Recommendation for `characteristics`.
    ///
    /// Uses `model` once it has been trained on enough entries, otherwise the
    /// heuristics. Rules naming a codec missing from `registry` fall through.
    pub fn recommend(
        &self,
        characteristics: &DataCharacteristics,
        model: Option<&SelectionModel>,
        registry: Option<&AlgorithmRegistry>,
    ) -> SelectionRecommendation {
        let features = characteristics.features();
        let available = |name: &str| registry.map_or(true, |r| r.contains(name));

        let rec = match model.filter(|m| m.trained_on() >= self.min_training_entries) {
            Some(model) => self.apply_learned(model, &features, available),
            None => self.apply_heuristics(&features, available),
        };
        debug!(
            algorithm = %rec.algorithm,
            confidence = rec.confidence,
            source = ?rec.source,
            "selection recommendation"
        );
        rec
    }

    /// Heuristic answer with confidence capped as provisional.
    pub fn provisional(
        &self,
        features: &Features,
        available: impl Fn(&str) -> bool,
    ) -> SelectionRecommendation {
        let mut rec = self.apply_heuristics(features, available);
        rec.confidence = rec.confidence.min(PROVISIONAL_CONFIDENCE_CAP);
        rec.source = RecommendationSource::Provisional;
        rec
    }

    pub fn apply_learned(
        &self,
        model: &SelectionModel,
        features: &Features,
        available: impl Fn(&str) -> bool,
    ) -> SelectionRecommendation {
        match model.rules().first_match(features, available) {
            Some(rule) => SelectionRecommendation::from_rule(rule, RecommendationSource::Learned),
            None => SelectionRecommendation {
                algorithm: self.config.balanced_algorithm.clone(),
                confidence: UNMATCHED_CONFIDENCE,
                expected_ratio: BALANCED_CLASS.1,
                reason: "no learned rule matched: balanced codec".into(),
                source: RecommendationSource::Learned,
            },
        }
    }

    fn apply_heuristics(&self, features: &Features, available: impl Fn(&str) -> bool) -> SelectionRecommendation {
        let rules = self.heuristic_rule_set();
        // The final rule is `Always`, so a match is guaranteed.
        let rule = rules
            .first_match(features, available)
            .unwrap_or(&rules.rules[rules.rules.len() - 1]);
        SelectionRecommendation::from_rule(rule, RecommendationSource::Heuristic)
    }
}
