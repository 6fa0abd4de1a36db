use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::calculator::{group_average, CategoryScore, GateSignals};
use super::config::{ScoreGroup, ScoringModelConfig};

/// Scoring outcome status before admin rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStatus {
    Approved,
    Conditional,
    Rejected,
}

impl ScoringStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ScoringStatus::Approved => "approved",
            ScoringStatus::Conditional => "conditional",
            ScoringStatus::Rejected => "rejected",
        }
    }
}

pub(crate) struct GateDecision {
    pub status: ScoringStatus,
    pub classification: String,
    pub knock_out_reason: Option<String>,
}

const CLASSIFICATION_EXCELLENT: &str = "Sobresaliente";
const CLASSIFICATION_APPROVED: &str = "Aprobado";
const CLASSIFICATION_CONDITIONAL: &str = "Condicional";
const CLASSIFICATION_CRITICAL_BLOCK: &str = "No Aprobado (Bloque critico)";
const CLASSIFICATION_KNOCK_OUT: &str = "No Aprobado (Knock-out)";

fn group_gate_reason(config: &ScoringModelConfig, category: &str) -> String {
    let label = config
        .group_for(category)
        .map(ScoreGroup::label)
        .unwrap_or(category);
    format!("{label} group below minimum")
}

/// Apply the gate cascade and the classification thresholds.
///
/// Gates run in a fixed order and each can only worsen the outcome; the first
/// one to fire decides the rejection reason.
pub(crate) fn decide_status(
    global: f64,
    categories: &BTreeMap<String, CategoryScore>,
    signals: &GateSignals,
    config: &ScoringModelConfig,
) -> GateDecision {
    if let Some(question) = &signals.knock_out {
        return GateDecision {
            status: ScoringStatus::Rejected,
            classification: CLASSIFICATION_KNOCK_OUT.to_string(),
            knock_out_reason: Some(format!("Knock-out question failed: {question}")),
        };
    }

    for category in &config.critical_categories {
        let Some(entry) = categories.get(category) else {
            continue;
        };
        if entry.answered_weight > 0.0 && entry.score < config.minimums.critical_category {
            return GateDecision {
                status: ScoringStatus::Rejected,
                classification: CLASSIFICATION_CRITICAL_BLOCK.to_string(),
                knock_out_reason: Some(group_gate_reason(config, category)),
            };
        }
    }

    let group_minimums = [
        (ScoreGroup::Quality, config.minimums.quality_group),
        (ScoreGroup::Staff, config.minimums.staff_group),
    ];
    for (group, minimum) in group_minimums {
        if let Some(average) = group_average(categories, config, group) {
            if average < minimum {
                return GateDecision {
                    status: ScoringStatus::Rejected,
                    classification: CLASSIFICATION_CRITICAL_BLOCK.to_string(),
                    knock_out_reason: Some(format!("{} group below minimum", group.label())),
                };
            }
        }
    }

    let failure_cutoff = config.minimums.critical_failures_for_rejection.max(1);
    if signals.critical_failures >= failure_cutoff {
        return GateDecision {
            status: ScoringStatus::Rejected,
            classification: CLASSIFICATION_CRITICAL_BLOCK.to_string(),
            knock_out_reason: Some(format!(
                "{} critical question(s) failed",
                signals.critical_failures
            )),
        };
    }

    if global >= config.thresholds.excellent {
        GateDecision {
            status: ScoringStatus::Approved,
            classification: CLASSIFICATION_EXCELLENT.to_string(),
            knock_out_reason: None,
        }
    } else if global >= config.thresholds.approved {
        GateDecision {
            status: ScoringStatus::Approved,
            classification: CLASSIFICATION_APPROVED.to_string(),
            knock_out_reason: None,
        }
    } else {
        GateDecision {
            status: ScoringStatus::Conditional,
            classification: CLASSIFICATION_CONDITIONAL.to_string(),
            knock_out_reason: None,
        }
    }
}
