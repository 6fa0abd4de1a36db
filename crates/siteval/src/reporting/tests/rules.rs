use super::common::*;
use crate::reporting::domain::{FinalStatus, QualitativeLabel, TriggerCondition};
use crate::reporting::rules::{determine_final_status, resolve_score_label};
use crate::scoring::ScoringStatus;

#[test]
fn resolves_labels_from_configured_bands() {
    let mappings = mappings();
    assert_eq!(resolve_score_label(92.0, &mappings), QualitativeLabel::Adequate);
    assert_eq!(
        resolve_score_label(79.4, &mappings),
        QualitativeLabel::PartiallyAdequate
    );
    assert_eq!(
        resolve_score_label(30.0, &mappings),
        QualitativeLabel::CriticalGap
    );
    assert_eq!(
        resolve_score_label(3.0, &mappings),
        QualitativeLabel::NotEvidenced
    );
}

#[test]
fn rounds_before_resolving() {
    let mappings = mappings();
    assert_eq!(resolve_score_label(79.6, &mappings), QualitativeLabel::Adequate);
}

#[test]
fn falls_back_to_fixed_cutoffs_without_mappings() {
    assert_eq!(resolve_score_label(85.0, &[]), QualitativeLabel::Adequate);
    assert_eq!(
        resolve_score_label(60.0, &[]),
        QualitativeLabel::PartiallyAdequate
    );
    assert_eq!(resolve_score_label(30.0, &[]), QualitativeLabel::CriticalGap);
    assert_eq!(resolve_score_label(10.0, &[]), QualitativeLabel::NotEvidenced);
}

#[test]
fn seeds_final_status_from_scoring_status() {
    let evaluation =
        determine_final_status(ScoringStatus::Conditional, &category_scores(&[]), &[], &mappings());
    assert_eq!(evaluation.final_status, FinalStatus::ConditionallyApproved);
    assert!(evaluation.triggered.is_empty());
}

#[test]
fn any_gap_trigger_fires_on_critical_gap_and_not_evidenced() {
    let scores = category_scores(&[("patient_safety", 30.0), ("staff", 10.0)]);
    let rules = vec![
        rule("r-ps", "patient_safety", TriggerCondition::AnyGap, 10),
        rule("r-staff", "staff", TriggerCondition::AnyGap, 5),
    ];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    assert_eq!(evaluation.triggered.len(), 2);
}

#[test]
fn below_adequate_trigger_spares_adequate_domains() {
    let scores = category_scores(&[("patient_safety", 85.0), ("staff", 70.0)]);
    let rules = vec![
        rule("r-ps", "patient_safety", TriggerCondition::BelowAdequate, 10),
        rule("r-staff", "staff", TriggerCondition::BelowAdequate, 5),
    ];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    assert_eq!(evaluation.triggered.len(), 1);
    assert_eq!(evaluation.triggered[0].id.0, "r-staff");
}

#[test]
fn exact_trigger_matches_only_the_named_label() {
    let scores = category_scores(&[("staff", 30.0)]);
    let rules = vec![
        rule(
            "r-gap",
            "staff",
            TriggerCondition::Exact(QualitativeLabel::CriticalGap),
            10,
        ),
        rule(
            "r-none",
            "staff",
            TriggerCondition::Exact(QualitativeLabel::NotEvidenced),
            5,
        ),
    ];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    assert_eq!(evaluation.triggered.len(), 1);
    assert_eq!(evaluation.triggered[0].id.0, "r-gap");
}

#[test]
fn blocking_rule_downgrades_approved_to_conditional() {
    let scores = category_scores(&[("staff", 30.0)]);
    let mut blocking = rule("r-block", "staff", TriggerCondition::AnyGap, 10);
    blocking.blocks_approval = true;

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &[blocking], &mappings());

    assert_eq!(evaluation.final_status, FinalStatus::ConditionallyApproved);
}

#[test]
fn forced_minimum_raises_severity() {
    let scores = category_scores(&[("patient_safety", 10.0)]);
    let rules = vec![blocking_rule("r-ps", "patient_safety")];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    assert_eq!(evaluation.final_status, FinalStatus::NotApproved);
}

#[test]
fn later_lenient_rules_never_relax_the_status() {
    let scores = category_scores(&[("patient_safety", 10.0), ("staff", 30.0)]);
    let mut lenient = rule("r-lenient", "staff", TriggerCondition::AnyGap, 1);
    lenient.forces_minimum_status = Some(FinalStatus::Approved);
    let rules = vec![blocking_rule("r-ps", "patient_safety"), lenient];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    assert_eq!(evaluation.final_status, FinalStatus::NotApproved);
    assert_eq!(evaluation.triggered.len(), 2);
}

#[test]
fn rules_without_a_matching_score_are_skipped() {
    let scores = category_scores(&[("staff", 30.0)]);
    let rules = vec![rule(
        "r-missing",
        "laboratory",
        TriggerCondition::AnyGap,
        10,
    )];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    assert!(evaluation.triggered.is_empty());
    assert_eq!(evaluation.final_status, FinalStatus::Approved);
}

#[test]
fn inactive_rules_do_not_participate() {
    let scores = category_scores(&[("staff", 10.0)]);
    let mut inactive = blocking_rule("r-off", "staff");
    inactive.active = false;

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &[inactive], &mappings());

    assert!(evaluation.triggered.is_empty());
    assert_eq!(evaluation.final_status, FinalStatus::Approved);
}

#[test]
fn triggered_rules_come_back_in_priority_order() {
    let scores = category_scores(&[("patient_safety", 10.0), ("staff", 10.0)]);
    let rules = vec![
        rule("r-low", "staff", TriggerCondition::AnyGap, 1),
        rule("r-high", "patient_safety", TriggerCondition::AnyGap, 50),
    ];

    let evaluation =
        determine_final_status(ScoringStatus::Approved, &scores, &rules, &mappings());

    let ids: Vec<&str> = evaluation
        .triggered
        .iter()
        .map(|rule| rule.id.0.as_str())
        .collect();
    assert_eq!(ids, vec!["r-high", "r-low"]);
}
