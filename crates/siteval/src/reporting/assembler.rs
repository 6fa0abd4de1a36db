use chrono::{DateTime, Utc};

use super::capa::generate_capa_items;
use super::domain::{
    AdminRule, DomainEvaluation, EvaluationDomain, NarrativeSnapshot, Report, ReportId,
    ReportTemplate, ScoreSnapshot, ScoreStatusMapping, SiteId,
};
use super::integrity::{compute_report_hash, ReportHashPayload};
use super::rules::{determine_final_status, resolve_score_label};

/// Live configuration frozen into a report at generation time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub rules: Vec<AdminRule>,
    pub templates: Vec<ReportTemplate>,
    pub domains: Vec<EvaluationDomain>,
    pub mappings: Vec<ScoreStatusMapping>,
}

/// Lineage of previously generated reports for the site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorReports {
    pub count: u32,
    pub latest: Option<ReportId>,
}

/// Assemble a complete, hash-anchored report from pre-fetched state.
///
/// Pure except for the caller-supplied `generated_at`; the snapshot embeds
/// everything needed to re-render or re-verify the report without touching
/// live configuration.
pub fn assemble_report(
    report_id: ReportId,
    site_id: SiteId,
    generated_by_user_id: String,
    score_snapshot: ScoreSnapshot,
    snapshot: ConfigSnapshot,
    prior: PriorReports,
    generated_at: DateTime<Utc>,
) -> Result<Report, serde_json::Error> {
    let evaluation = determine_final_status(
        score_snapshot.scoring_status,
        &score_snapshot.category_scores,
        &snapshot.rules,
        &snapshot.mappings,
    );

    let capa_items = generate_capa_items(&evaluation.triggered, &snapshot.domains);

    let narrative = snapshot
        .templates
        .iter()
        .find(|template| template.status_type == evaluation.final_status)
        .map(|template| NarrativeSnapshot {
            executive_summary: template.executive_summary.clone(),
            reevaluation_clause: template.reevaluation_clause.clone(),
            domain_paragraphs: template.domain_paragraphs.clone(),
        })
        .unwrap_or_default();

    let mut visible_domains: Vec<&EvaluationDomain> = snapshot
        .domains
        .iter()
        .filter(|domain| domain.visible_in_report)
        .collect();
    visible_domains.sort_by_key(|domain| domain.display_order);

    let domain_evaluations = visible_domains
        .into_iter()
        .filter_map(|domain| {
            score_snapshot
                .category_scores
                .get(&domain.domain_key)
                .map(|score| DomainEvaluation {
                    domain_key: domain.domain_key.clone(),
                    display_name: domain.display_name.clone(),
                    score: score.round().clamp(0.0, 100.0) as u8,
                    label: resolve_score_label(*score, &snapshot.mappings),
                })
        })
        .collect();

    let report_version = format_report_version(&site_id, generated_at, prior.count + 1);

    let hash_sha256 = compute_report_hash(&ReportHashPayload {
        report_version: report_version.clone(),
        site_id: site_id.clone(),
        final_status: evaluation.final_status,
        score_snapshot: score_snapshot.clone(),
        capa_items: capa_items.clone(),
        generated_at,
    })?;

    Ok(Report {
        id: report_id,
        site_id,
        report_version,
        generated_by_user_id,
        status_at_generation: score_snapshot.scoring_status,
        final_status: evaluation.final_status,
        score_snapshot,
        rules_snapshot: snapshot.rules,
        templates_snapshot: snapshot.templates,
        mappings_snapshot: snapshot.mappings,
        domain_evaluations,
        narrative,
        capa_items,
        triggered_rules: evaluation
            .triggered
            .into_iter()
            .map(|rule| rule.id)
            .collect(),
        hash_sha256,
        is_locked: false,
        previous_report_id: prior.latest,
        generated_at,
    })
}

/// `REPORT-<first 8 site chars, uppercased>-<YYYYMMDD>-v<N>`.
fn format_report_version(site_id: &SiteId, generated_at: DateTime<Utc>, version: u32) -> String {
    let site8: String = site_id.0.chars().take(8).collect::<String>().to_uppercase();
    format!(
        "REPORT-{}-{}-v{}",
        site8,
        generated_at.format("%Y%m%d"),
        version
    )
}
