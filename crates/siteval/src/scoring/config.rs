use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weighting groups used to blend category averages into the global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGroup {
    Infrastructure,
    Staff,
    Quality,
    Recruitment,
    Systems,
}

impl ScoreGroup {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreGroup::Infrastructure => "Infrastructure",
            ScoreGroup::Staff => "Staff",
            ScoreGroup::Quality => "Quality",
            ScoreGroup::Recruitment => "Recruitment",
            ScoreGroup::Systems => "Systems",
        }
    }

    pub const fn all() -> [ScoreGroup; 5] {
        [
            ScoreGroup::Infrastructure,
            ScoreGroup::Staff,
            ScoreGroup::Quality,
            ScoreGroup::Recruitment,
            ScoreGroup::Systems,
        ]
    }
}

/// Relative weight of each group in the global average. Calibration assumes
/// the weights approximately sum to 100, but the engine normalizes over the
/// groups that actually produced a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupWeights {
    pub infrastructure: f64,
    pub staff: f64,
    pub quality: f64,
    pub recruitment: f64,
    pub systems: f64,
}

impl GroupWeights {
    pub fn weight_for(&self, group: ScoreGroup) -> f64 {
        match group {
            ScoreGroup::Infrastructure => self.infrastructure,
            ScoreGroup::Staff => self.staff,
            ScoreGroup::Quality => self.quality,
            ScoreGroup::Recruitment => self.recruitment,
            ScoreGroup::Systems => self.systems,
        }
    }
}

/// Gate thresholds. Percentages are 0-100; `critical_failures_for_rejection`
/// must be at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateMinimums {
    pub critical_category: f64,
    pub quality_group: f64,
    pub staff_group: f64,
    pub critical_failures_for_rejection: u32,
}

/// Score cutoffs for the classification tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusThresholds {
    pub excellent: f64,
    pub approved: f64,
}

/// Full scoring-model configuration consumed by the engine.
///
/// `category_groups` is a declared mapping; categories never resolve to a
/// group by name similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringModelConfig {
    pub group_weights: GroupWeights,
    pub minimums: GateMinimums,
    pub thresholds: StatusThresholds,
    pub category_groups: BTreeMap<String, ScoreGroup>,
    pub critical_categories: Vec<String>,
}

impl ScoringModelConfig {
    pub fn group_for(&self, category: &str) -> Option<ScoreGroup> {
        self.category_groups.get(category).copied()
    }

    pub fn is_critical(&self, category: &str) -> bool {
        self.critical_categories
            .iter()
            .any(|critical| critical == category)
    }
}

impl Default for ScoringModelConfig {
    fn default() -> Self {
        let mut category_groups = BTreeMap::new();
        category_groups.insert("Infrastructure".to_string(), ScoreGroup::Infrastructure);
        category_groups.insert("Staff".to_string(), ScoreGroup::Staff);
        category_groups.insert("Quality Management".to_string(), ScoreGroup::Quality);
        category_groups.insert("Patient Safety".to_string(), ScoreGroup::Quality);
        category_groups.insert("Recruitment".to_string(), ScoreGroup::Recruitment);
        category_groups.insert("Systems".to_string(), ScoreGroup::Systems);

        Self {
            group_weights: GroupWeights {
                infrastructure: 20.0,
                staff: 25.0,
                quality: 30.0,
                recruitment: 15.0,
                systems: 10.0,
            },
            minimums: GateMinimums {
                critical_category: 50.0,
                quality_group: 50.0,
                staff_group: 40.0,
                critical_failures_for_rejection: 2,
            },
            thresholds: StatusThresholds {
                excellent: 90.0,
                approved: 70.0,
            },
            category_groups,
            critical_categories: vec![
                "Quality Management".to_string(),
                "Patient Safety".to_string(),
            ],
        }
    }
}
