use std::collections::BTreeMap;

use super::domain::{AdminRule, FinalStatus, QualitativeLabel, ScoreStatusMapping};
use crate::scoring::ScoringStatus;

/// Outcome of one rule-evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    pub final_status: FinalStatus,
    pub triggered: Vec<AdminRule>,
}

/// Resolve a domain score to its qualitative label. The score is rounded
/// first; when no configured band matches, the fixed 80/50/25 cutoffs apply.
pub fn resolve_score_label(score: f64, mappings: &[ScoreStatusMapping]) -> QualitativeLabel {
    let rounded = score.round().clamp(0.0, 100.0) as u8;

    for mapping in mappings {
        if rounded >= mapping.min_score && rounded <= mapping.max_score {
            return mapping.label;
        }
    }

    if rounded >= 80 {
        QualitativeLabel::Adequate
    } else if rounded >= 50 {
        QualitativeLabel::PartiallyAdequate
    } else if rounded >= 25 {
        QualitativeLabel::CriticalGap
    } else {
        QualitativeLabel::NotEvidenced
    }
}

/// Evaluate the active admin rules against per-domain scores.
///
/// Rules run highest priority first (stable order on ties). Transitions are
/// monotonic: a triggered rule can downgrade an Approved status or raise the
/// severity floor, never relax the outcome. Rules whose domain has no score
/// are skipped.
pub fn determine_final_status(
    scoring_status: ScoringStatus,
    category_scores: &BTreeMap<String, f64>,
    active_rules: &[AdminRule],
    mappings: &[ScoreStatusMapping],
) -> RuleEvaluation {
    let mut final_status = FinalStatus::from_scoring(scoring_status);
    let mut triggered = Vec::new();

    let mut rules: Vec<&AdminRule> = active_rules.iter().filter(|rule| rule.active).collect();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));

    for rule in rules {
        let Some(score) = category_scores.get(&rule.domain_key) else {
            continue;
        };

        let label = resolve_score_label(*score, mappings);
        if !rule.trigger.matches(label) {
            continue;
        }

        triggered.push(rule.clone());

        if rule.blocks_approval && final_status == FinalStatus::Approved {
            final_status = FinalStatus::ConditionallyApproved;
        }

        if let Some(minimum) = rule.forces_minimum_status {
            if minimum.severity() > final_status.severity() {
                final_status = minimum;
            }
        }
    }

    RuleEvaluation {
        final_status,
        triggered,
    }
}
