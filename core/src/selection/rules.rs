//! selection/rules.rs
//! Selection rules as plain data.
//!
//! A rule set is evaluated, never executed: conditions form a closed enum,
//! so a rule set received from outside the process cannot carry logic.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profiler::{CoarseType, Features, Structure};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Condition {
    Always,
    RepetitionAbove(f64),
    EntropyAbove(f64),
    SizeAbove(u64),
    SizeBelow(u64),
    StructureIs(Structure),
    TypeIs(CoarseType),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn matches(&self, f: &Features) -> bool {
        match self {
            Condition::Always => true,
            Condition::RepetitionAbove(t) => f.repetition > *t,
            Condition::EntropyAbove(t) => f.entropy > *t,
            Condition::SizeAbove(t) => f.size_bytes > *t,
            Condition::SizeBelow(t) => f.size_bytes < *t,
            Condition::StructureIs(s) => f.structure == *s,
            Condition::TypeIs(t) => f.coarse_type == *t,
            Condition::All(cs) => cs.iter().all(|c| c.matches(f)),
            Condition::Any(cs) => cs.iter().any(|c| c.matches(f)),
        }
    }

    /// Number of leaf predicates that must hold; `Any` counts its least
    /// demanding branch.
    pub fn specificity(&self) -> usize {
        match self {
            Condition::Always => 0,
            Condition::All(cs) => cs.iter().map(Condition::specificity).sum(),
            Condition::Any(cs) => cs.iter().map(Condition::specificity).min().unwrap_or(0),
            _ => 1,
        }
    }

    fn is_well_formed(&self) -> bool {
        match self {
            Condition::RepetitionAbove(t) | Condition::EntropyAbove(t) => t.is_finite(),
            Condition::All(cs) | Condition::Any(cs) => !cs.is_empty() && cs.iter().all(Condition::is_well_formed),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRule {
    pub condition: Condition,
    pub algorithm: String,
    pub confidence: f64,
    pub expected_ratio: f64,
    pub reason: String,
}

impl SelectionRule {
    pub fn is_valid(&self) -> bool {
        !self.algorithm.is_empty()
            && (0.0..=1.0).contains(&self.confidence)
            && (0.0..=1.0).contains(&self.expected_ratio)
            && self.condition.is_well_formed()
    }
}

/// Ordered rules; the first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<SelectionRule>,
    /// History entries the set was derived from.
    pub trained_on: usize,
    pub built_at: DateTime<Utc>,
}

impl RuleSet {
    pub fn new(rules: Vec<SelectionRule>, trained_on: usize) -> Self {
        Self { rules, trained_on, built_at: Utc::now() }
    }

    /// Reorder most specific first. Stable, so equally specific rules keep
    /// their given order.
    pub fn sort_by_specificity(&mut self) {
        self.rules.sort_by_key(|r| std::cmp::Reverse(r.condition.specificity()));
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rules.is_empty() {
            return Err("rule set is empty".into());
        }
        match self.rules.iter().position(|r| !r.is_valid()) {
            Some(i) => Err(format!("rule {} is malformed", i)),
            None => Ok(()),
        }
    }

    pub fn first_match<'a>(
        &'a self,
        features: &Features,
        available: impl Fn(&str) -> bool,
    ) -> Option<&'a SelectionRule> {
        self.rules.iter().find(|r| {
            r.condition.matches(features)
                && (r.condition == Condition::Always || available(&r.algorithm))
        })
    }
}
