use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    AdminRule, FinalStatus, QualitativeLabel, ReportTemplate, ScoreStatusMapping, TriggerCondition,
};

/// Partial update for an admin rule; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleUpdate {
    pub domain_key: Option<String>,
    pub trigger: Option<TriggerCondition>,
    pub priority: Option<i32>,
    pub forces_minimum_status: Option<FinalStatus>,
    pub blocks_approval: Option<bool>,
    pub requires_capa: Option<bool>,
    pub required_action: Option<String>,
    pub evidence_required: Option<String>,
    pub recommended_timeline_days: Option<u32>,
    pub active: Option<bool>,
}

/// Partial update for a report template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    pub executive_summary: Option<String>,
    pub reevaluation_clause: Option<String>,
    pub domain_paragraphs: Option<BTreeMap<String, String>>,
}

/// Partial update for a score-status mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingUpdate {
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
    pub label: Option<QualitativeLabel>,
}

/// A rule edit is critical when it makes the evaluation more lenient:
/// lowering the forced-status severity, removing the approval block, or
/// deactivating a rule that blocks approval. Tightening is never critical.
pub fn detect_critical_rule_change(existing: &AdminRule, updates: &RuleUpdate) -> bool {
    if let (Some(new_minimum), Some(old_minimum)) =
        (updates.forces_minimum_status, existing.forces_minimum_status)
    {
        if new_minimum.severity() < old_minimum.severity() {
            return true;
        }
    }

    if updates.blocks_approval == Some(false) && existing.blocks_approval {
        return true;
    }

    if updates.active == Some(false) && existing.active && existing.blocks_approval {
        return true;
    }

    false
}

/// Editing the executive summary of the Not Approved template rewrites what
/// rejected sites are told; that requires a justification.
pub fn detect_critical_template_change(existing: &ReportTemplate, updates: &TemplateUpdate) -> bool {
    existing.status_type == FinalStatus::NotApproved
        && updates
            .executive_summary
            .as_deref()
            .is_some_and(|summary| summary != existing.executive_summary)
}

/// Widening the Adequate band by lowering its floor lets weaker scores pass
/// as adequate.
pub fn detect_critical_mapping_change(
    existing: &ScoreStatusMapping,
    updates: &MappingUpdate,
) -> bool {
    existing.label == QualitativeLabel::Adequate
        && updates
            .min_score
            .is_some_and(|min_score| min_score < existing.min_score)
}

pub fn apply_rule_update(existing: &AdminRule, updates: &RuleUpdate) -> AdminRule {
    let mut rule = existing.clone();
    if let Some(domain_key) = &updates.domain_key {
        rule.domain_key = domain_key.clone();
    }
    if let Some(trigger) = &updates.trigger {
        rule.trigger = trigger.clone();
    }
    if let Some(priority) = updates.priority {
        rule.priority = priority;
    }
    if let Some(minimum) = updates.forces_minimum_status {
        rule.forces_minimum_status = Some(minimum);
    }
    if let Some(blocks_approval) = updates.blocks_approval {
        rule.blocks_approval = blocks_approval;
    }
    if let Some(requires_capa) = updates.requires_capa {
        rule.requires_capa = requires_capa;
    }
    if let Some(required_action) = &updates.required_action {
        rule.required_action = required_action.clone();
    }
    if let Some(evidence_required) = &updates.evidence_required {
        rule.evidence_required = evidence_required.clone();
    }
    if let Some(timeline) = updates.recommended_timeline_days {
        rule.recommended_timeline_days = Some(timeline);
    }
    if let Some(active) = updates.active {
        rule.active = active;
    }
    rule.version += 1;
    rule
}

pub fn apply_template_update(existing: &ReportTemplate, updates: &TemplateUpdate) -> ReportTemplate {
    let mut template = existing.clone();
    if let Some(executive_summary) = &updates.executive_summary {
        template.executive_summary = executive_summary.clone();
    }
    if let Some(reevaluation_clause) = &updates.reevaluation_clause {
        template.reevaluation_clause = reevaluation_clause.clone();
    }
    if let Some(domain_paragraphs) = &updates.domain_paragraphs {
        template.domain_paragraphs = domain_paragraphs.clone();
    }
    template
}

pub fn apply_mapping_update(
    existing: &ScoreStatusMapping,
    updates: &MappingUpdate,
) -> ScoreStatusMapping {
    let mut mapping = existing.clone();
    if let Some(min_score) = updates.min_score {
        mapping.min_score = min_score;
    }
    if let Some(max_score) = updates.max_score {
        mapping.max_score = max_score;
    }
    if let Some(label) = updates.label {
        mapping.label = label;
    }
    mapping
}
