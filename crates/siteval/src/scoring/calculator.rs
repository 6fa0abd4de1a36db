use std::collections::BTreeMap;

use super::config::ScoringModelConfig;
use super::questions::{Answer, AnswerSheet, AnswerValue, Question, QuestionKind, YesNoAnswer};

/// Weighted result for one category. Categories whose answered weight is zero
/// stay out of the global average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CategoryScore {
    pub score: f64,
    pub answered_weight: f64,
}

/// Gate-relevant facts gathered while scoring, consumed by the gate cascade.
pub(crate) struct GateSignals {
    pub knock_out: Option<String>,
    pub critical_failures: u32,
}

/// Fixed star-to-credit table. A five-star answer earns a bonus above full
/// credit; category scores are clamped to 100 afterwards.
pub(crate) fn star_factor(stars: u8) -> f64 {
    match stars {
        0 | 1 => 0.0,
        2 => 0.5,
        3 => 1.0,
        4 => 1.1,
        _ => 1.2,
    }
}

const NEGATION_TOKENS: [&str; 5] = ["no", "none", "n/a", "ninguno", "nada"];

fn is_negation(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    NEGATION_TOKENS.iter().any(|token| {
        lowered == *token
            || lowered
                .strip_prefix(token)
                .is_some_and(|rest| rest.starts_with([' ', ',', '.']))
    })
}

/// Credit for a free-text answer: full on any keyword match, zero when the
/// text reads as a negation, half otherwise. Empty text counts as unanswered.
pub(crate) fn text_credit(text: &str, keywords: &[String]) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if is_negation(trimmed) {
        return Some(0.0);
    }

    let lowered = trimmed.to_lowercase();
    let matched = keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && lowered.contains(&keyword.to_lowercase()));

    Some(if matched { 1.0 } else { 0.5 })
}

/// Credit earned by an answer, or `None` when the question counts as
/// unanswered (missing data is excluded from denominators, never penalized).
pub(crate) fn answer_credit(question: &Question, answer: &Answer) -> Option<f64> {
    match (&question.kind, &answer.value) {
        (QuestionKind::YesNo, AnswerValue::YesNo(YesNoAnswer::Yes)) => Some(1.0),
        (QuestionKind::YesNo, AnswerValue::YesNo(YesNoAnswer::No)) => Some(0.0),
        (QuestionKind::YesNo, AnswerValue::YesNo(YesNoAnswer::NotApplicable)) => None,
        (QuestionKind::Select, AnswerValue::Stars(stars)) => Some(star_factor(*stars)),
        (QuestionKind::Text, AnswerValue::Text(text)) => text_credit(text, &question.keywords),
        _ => None,
    }
}

/// Score every answered category and collect the gate signals in one pass.
pub(crate) fn score_answers(
    answers: &AnswerSheet,
    questions: &[Question],
    config: &ScoringModelConfig,
) -> (BTreeMap<String, CategoryScore>, f64, GateSignals) {
    let mut weighted_credit: BTreeMap<String, f64> = BTreeMap::new();
    let mut weight_totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut knock_out = None;
    let mut critical_failures = 0u32;

    for question in questions.iter().filter(|question| question.enabled) {
        let Some(answer) = answers.get(&question.id) else {
            continue;
        };
        let Some(credit) = answer_credit(question, answer) else {
            continue;
        };

        let weight = question.weight.max(0.0);
        *weighted_credit.entry(question.category.clone()).or_default() += weight * credit;
        *weight_totals.entry(question.category.clone()).or_default() += weight;

        if credit == 0.0 {
            if question.is_knock_out {
                if knock_out.is_none() {
                    knock_out = Some(question.text.clone());
                }
            } else if config.is_critical(&question.category) {
                critical_failures += 1;
            }
        }
    }

    let mut categories = BTreeMap::new();
    for (category, credit_sum) in weighted_credit {
        let answered_weight = weight_totals.get(&category).copied().unwrap_or(0.0);
        let score = if answered_weight > 0.0 {
            (100.0 * credit_sum / answered_weight).clamp(0.0, 100.0)
        } else {
            0.0
        };
        categories.insert(
            category,
            CategoryScore {
                score,
                answered_weight,
            },
        );
    }

    let global = global_score(&categories, config);

    (
        categories,
        global,
        GateSignals {
            knock_out,
            critical_failures,
        },
    )
}

/// Mean score of the categories mapped to `group`, when any were answered.
pub(crate) fn group_average(
    categories: &BTreeMap<String, CategoryScore>,
    config: &ScoringModelConfig,
    group: super::config::ScoreGroup,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (category, entry) in categories {
        if entry.answered_weight > 0.0 && config.group_for(category) == Some(group) {
            sum += entry.score;
            count += 1;
        }
    }

    (count > 0).then(|| sum / count as f64)
}

fn global_score(categories: &BTreeMap<String, CategoryScore>, config: &ScoringModelConfig) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;

    for group in super::config::ScoreGroup::all() {
        let Some(average) = group_average(categories, config, group) else {
            continue;
        };
        let weight = config.group_weights.weight_for(group).max(0.0);
        if weight > 0.0 {
            weighted_sum += weight * average;
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        (weighted_sum / weight_sum).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
