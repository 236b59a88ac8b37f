//! selection/model.rs
//! Learned selection model variants.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::selection::rules::RuleSet;

/// A learned model is always a rule list; the variant records where it came
/// from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rules", rename_all = "snake_case")]
pub enum SelectionModel {
    /// Accepted from a retraining collaborator after validation.
    RuleBased(RuleSet),
    /// Rebuilt locally from per-algorithm aggregate statistics.
    StatsDerived(RuleSet),
}

impl SelectionModel {
    pub fn rules(&self) -> &RuleSet {
        match self {
            SelectionModel::RuleBased(r) | SelectionModel::StatsDerived(r) => r,
        }
    }

    pub fn trained_on(&self) -> usize {
        self.rules().trained_on
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            SelectionModel::RuleBased(_) => ModelKind::RuleBased,
            SelectionModel::StatsDerived(_) => ModelKind::StatsDerived,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    None,
    RuleBased,
    StatsDerived,
}

impl ModelKind {
    pub fn of(model: Option<&SelectionModel>) -> Self {
        model.map_or(ModelKind::None, SelectionModel::kind)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::None         => "none",
            ModelKind::RuleBased    => "rule_based",
            ModelKind::StatsDerived => "stats_derived",
        };
        f.write_str(name)
    }
}
