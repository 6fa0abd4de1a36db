use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for questionnaire questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Input style of a question, fixed at authoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Yes / No / Not applicable.
    YesNo,
    /// 1-5 star rating.
    Select,
    /// Free text, scored against the question's keyword list.
    Text,
}

/// Question definition as authored in the questionnaire admin.
///
/// Weight contributes to category denominators only while `enabled`; a
/// knock-out question answered with its failing value forces rejection
/// independent of the numeric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub category: String,
    pub weight: f64,
    pub is_knock_out: bool,
    pub enabled: bool,
    pub kind: QuestionKind,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Yes/No answer states. `NotApplicable` is excluded from denominators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNoAnswer {
    Yes,
    No,
    NotApplicable,
}

/// Submitted value for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    YesNo(YesNoAnswer),
    Stars(u8),
    Text(String),
}

/// Answer with optional attachment references (opaque storage keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub value: AnswerValue,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Answer {
    pub fn new(value: AnswerValue) -> Self {
        Self {
            value,
            attachments: Vec::new(),
        }
    }
}

/// Full answer set for one questionnaire submission, keyed by question id.
pub type AnswerSheet = BTreeMap<QuestionId, Answer>;
