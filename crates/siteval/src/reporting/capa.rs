use super::domain::{AdminRule, CapaItem, EvaluationDomain};

const DEFAULT_TIMELINE_DAYS: u32 = 90;
const FALLBACK_ACTION: &str = "Submit a corrective action plan addressing the identified gap";
const FALLBACK_EVIDENCE: &str = "Documented evidence of the implemented corrective action";

/// Derive corrective-action items from the triggered rules that require
/// remediation, highest priority first.
pub fn generate_capa_items(triggered: &[AdminRule], domains: &[EvaluationDomain]) -> Vec<CapaItem> {
    let mut items: Vec<CapaItem> = triggered
        .iter()
        .filter(|rule| rule.requires_capa)
        .map(|rule| {
            let domain_name = domains
                .iter()
                .find(|domain| domain.domain_key == rule.domain_key)
                .map(|domain| domain.display_name.clone())
                .unwrap_or_else(|| rule.domain_key.clone());

            let required_action = if rule.required_action.trim().is_empty() {
                FALLBACK_ACTION.to_string()
            } else {
                rule.required_action.clone()
            };
            let evidence_required = if rule.evidence_required.trim().is_empty() {
                FALLBACK_EVIDENCE.to_string()
            } else {
                rule.evidence_required.clone()
            };

            CapaItem {
                domain_key: rule.domain_key.clone(),
                domain_name,
                required_action,
                evidence_required,
                timeline_days: rule.recommended_timeline_days.unwrap_or(DEFAULT_TIMELINE_DAYS),
                priority: rule.priority,
            }
        })
        .collect();

    items.sort_by(|a, b| b.priority.cmp(&a.priority));
    items
}
