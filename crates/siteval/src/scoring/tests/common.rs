use std::collections::BTreeMap;

use crate::scoring::{
    Answer, AnswerSheet, AnswerValue, Question, QuestionId, QuestionKind, ScoringEngine,
    ScoringModelConfig, YesNoAnswer,
};

pub(super) fn select_question(id: &str, category: &str, weight: f64) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: format!("Rate the site's {}", category.to_lowercase()),
        category: category.to_string(),
        weight,
        is_knock_out: false,
        enabled: true,
        kind: QuestionKind::Select,
        keywords: Vec::new(),
    }
}

pub(super) fn yes_no_question(id: &str, category: &str, weight: f64) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: format!("Does the site meet the {category} requirement?"),
        category: category.to_string(),
        weight,
        is_knock_out: false,
        enabled: true,
        kind: QuestionKind::YesNo,
        keywords: Vec::new(),
    }
}

pub(super) fn knock_out_question(id: &str, category: &str) -> Question {
    Question {
        is_knock_out: true,
        ..yes_no_question(id, category, 1.0)
    }
}

pub(super) fn text_question(id: &str, category: &str, keywords: &[&str]) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: "Describe the site's emergency procedures".to_string(),
        category: category.to_string(),
        weight: 1.0,
        is_knock_out: false,
        enabled: true,
        kind: QuestionKind::Text,
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
    }
}

pub(super) fn stars(sheet: &mut AnswerSheet, id: &str, value: u8) {
    sheet.insert(
        QuestionId(id.to_string()),
        Answer::new(AnswerValue::Stars(value)),
    );
}

pub(super) fn yes_no(sheet: &mut AnswerSheet, id: &str, value: YesNoAnswer) {
    sheet.insert(
        QuestionId(id.to_string()),
        Answer::new(AnswerValue::YesNo(value)),
    );
}

pub(super) fn text(sheet: &mut AnswerSheet, id: &str, value: &str) {
    sheet.insert(
        QuestionId(id.to_string()),
        Answer::new(AnswerValue::Text(value.to_string())),
    );
}

/// Four-category questionnaire used by the classification scenarios:
/// Quality Management (5), Patient Safety (5), Staff (4), Infrastructure (3).
pub(super) fn standard_questionnaire() -> Vec<Question> {
    vec![
        select_question("q-quality", "Quality Management", 5.0),
        select_question("q-safety", "Patient Safety", 5.0),
        select_question("q-staff", "Staff", 4.0),
        select_question("q-infra", "Infrastructure", 3.0),
    ]
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringModelConfig::default())
}

pub(super) fn empty_sheet() -> AnswerSheet {
    BTreeMap::new()
}
