use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringStatus;

/// Identifier wrapper for evaluated clinical sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub String);

/// Identifier wrapper for generated reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingId(pub String);

/// Minimal site record; site CRUD lives outside this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
}

/// Final approval status of a report. Severity only ever increases during a
/// rule evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Approved,
    ConditionallyApproved,
    NotApproved,
}

impl FinalStatus {
    pub const fn severity(self) -> u8 {
        match self {
            FinalStatus::Approved => 1,
            FinalStatus::ConditionallyApproved => 2,
            FinalStatus::NotApproved => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FinalStatus::Approved => "Approved",
            FinalStatus::ConditionallyApproved => "Conditionally Approved",
            FinalStatus::NotApproved => "Not Approved",
        }
    }

    pub const fn from_scoring(status: ScoringStatus) -> Self {
        match status {
            ScoringStatus::Approved => FinalStatus::Approved,
            ScoringStatus::Conditional => FinalStatus::ConditionallyApproved,
            ScoringStatus::Rejected => FinalStatus::NotApproved,
        }
    }
}

/// Qualitative label assigned to a rounded domain score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitativeLabel {
    Adequate,
    PartiallyAdequate,
    CriticalGap,
    NotEvidenced,
}

impl QualitativeLabel {
    pub const fn label(self) -> &'static str {
        match self {
            QualitativeLabel::Adequate => "Adequate",
            QualitativeLabel::PartiallyAdequate => "Partially Adequate",
            QualitativeLabel::CriticalGap => "Critical Gap",
            QualitativeLabel::NotEvidenced => "Not Evidenced",
        }
    }
}

/// Condition under which an admin rule fires for a domain's resolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Fires only on the named label.
    Exact(QualitativeLabel),
    /// Fires on Critical Gap or Not Evidenced.
    AnyGap,
    /// Fires on anything short of Adequate.
    BelowAdequate,
}

impl TriggerCondition {
    pub fn matches(&self, label: QualitativeLabel) -> bool {
        match self {
            TriggerCondition::Exact(expected) => *expected == label,
            TriggerCondition::AnyGap => matches!(
                label,
                QualitativeLabel::CriticalGap | QualitativeLabel::NotEvidenced
            ),
            TriggerCondition::BelowAdequate => label != QualitativeLabel::Adequate,
        }
    }
}

/// Evaluation area along which rules and report sections are organized.
/// Domains referenced by historical reports are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationDomain {
    pub domain_key: String,
    pub display_name: String,
    pub description: String,
    pub display_order: u32,
    pub visible_in_report: bool,
}

/// Admin-defined decision rule evaluated against a domain's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRule {
    pub id: RuleId,
    pub domain_key: String,
    pub trigger: TriggerCondition,
    pub priority: i32,
    pub forces_minimum_status: Option<FinalStatus>,
    pub blocks_approval: bool,
    pub requires_capa: bool,
    pub required_action: String,
    pub evidence_required: String,
    pub recommended_timeline_days: Option<u32>,
    pub active: bool,
    pub version: u32,
}

/// Narrative text rendered into reports for one final status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: TemplateId,
    pub status_type: FinalStatus,
    pub executive_summary: String,
    pub reevaluation_clause: String,
    pub domain_paragraphs: BTreeMap<String, String>,
}

/// Inclusive score band mapped to a qualitative label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreStatusMapping {
    pub id: MappingId,
    pub min_score: u8,
    pub max_score: u8,
    pub label: QualitativeLabel,
}

/// Corrective-action item derived from a triggered rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapaItem {
    pub domain_key: String,
    pub domain_name: String,
    pub required_action: String,
    pub evidence_required: String,
    pub timeline_days: u32,
    pub priority: i32,
}

/// Frozen scoring result embedded in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub global_score: u8,
    pub scoring_status: ScoringStatus,
    pub category_scores: BTreeMap<String, f64>,
}

/// Narrative selected for the report's final status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSnapshot {
    pub executive_summary: String,
    pub reevaluation_clause: String,
    pub domain_paragraphs: BTreeMap<String, String>,
}

/// Per-domain line rendered in the report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvaluation {
    pub domain_key: String,
    pub display_name: String,
    pub score: u8,
    pub label: QualitativeLabel,
}

/// Versioned report artifact. Immutable after creation except for the
/// one-way `is_locked` transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub site_id: SiteId,
    pub report_version: String,
    pub generated_by_user_id: String,
    pub status_at_generation: ScoringStatus,
    pub final_status: FinalStatus,
    pub score_snapshot: ScoreSnapshot,
    pub rules_snapshot: Vec<AdminRule>,
    pub templates_snapshot: Vec<ReportTemplate>,
    pub mappings_snapshot: Vec<ScoreStatusMapping>,
    pub domain_evaluations: Vec<DomainEvaluation>,
    pub narrative: NarrativeSnapshot,
    pub capa_items: Vec<CapaItem>,
    pub triggered_rules: Vec<RuleId>,
    pub hash_sha256: String,
    pub is_locked: bool,
    pub previous_report_id: Option<ReportId>,
    pub generated_at: DateTime<Utc>,
}

/// Append-only signature row created by a successful acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSignature {
    pub id: String,
    pub report_id: ReportId,
    pub signed_by_name: String,
    pub signed_by_role: String,
    pub ip_address: String,
    pub user_agent: String,
    pub hash_at_signature: String,
    pub signature_method: String,
    pub signature_payload: String,
    pub signed_at: DateTime<Utc>,
}

/// Who performed a mutation, captured for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: Option<String>,
    pub name: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// Entity kinds tracked by the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    Report,
    AdminRule,
    ReportTemplate,
    ScoreMapping,
}

impl AuditEntityType {
    pub const fn label(self) -> &'static str {
        match self {
            AuditEntityType::Report => "report",
            AuditEntityType::AdminRule => "admin_rule",
            AuditEntityType::ReportTemplate => "report_template",
            AuditEntityType::ScoreMapping => "score_mapping",
        }
    }
}

/// Action kinds recorded against audited entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Generated,
    Acknowledged,
    Updated,
}

/// Append-only audit record for configuration mutations and report lifecycle
/// events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub entity_type: AuditEntityType,
    pub entity_id: String,
    pub action: AuditAction,
    pub actor: ActorContext,
    pub before_state: Option<serde_json::Value>,
    pub after_state: Option<serde_json::Value>,
    pub is_critical_change: bool,
    pub change_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
