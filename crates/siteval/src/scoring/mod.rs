//! Questionnaire scoring: weighted category scores, gate checks, and the
//! classification tiers that feed report generation.

mod calculator;
mod config;
mod gates;
mod questions;

#[cfg(test)]
mod tests;

pub use config::{GateMinimums, GroupWeights, ScoreGroup, ScoringModelConfig, StatusThresholds};
pub use gates::ScoringStatus;
pub use questions::{
    Answer, AnswerSheet, AnswerValue, Question, QuestionId, QuestionKind, YesNoAnswer,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stateless engine applying one scoring-model configuration to answer sheets.
pub struct ScoringEngine {
    config: ScoringModelConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringModelConfig {
        &self.config
    }

    /// Score an answer sheet. Pure: identical answers, questions, and config
    /// always produce an identical outcome.
    pub fn score(&self, answers: &AnswerSheet, questions: &[Question]) -> ScoreOutcome {
        let (categories, global, signals) =
            calculator::score_answers(answers, questions, &self.config);

        let decision = gates::decide_status(global, &categories, &signals, &self.config);

        let category_scores = categories
            .iter()
            .map(|(category, entry)| (category.clone(), entry.score))
            .collect();

        ScoreOutcome {
            score: global.round().clamp(0.0, 100.0) as u8,
            status: decision.status,
            classification: decision.classification,
            category_scores,
            knock_out_reason: decision.knock_out_reason,
        }
    }
}

/// Scoring result consumed by the report pipeline and the what-if simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: u8,
    pub status: ScoringStatus,
    pub classification: String,
    pub category_scores: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knock_out_reason: Option<String>,
}
