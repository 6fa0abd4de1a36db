use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::assembler::{assemble_report, ConfigSnapshot, PriorReports};
use super::domain::{
    ActorContext, AdminRule, AuditAction, AuditEntityType, AuditLogEntry, MappingId, Report,
    ReportId, ReportSignature, ReportTemplate, RuleId, ScoreSnapshot, ScoreStatusMapping, SiteId,
    TemplateId,
};
use super::guard::{
    apply_mapping_update, apply_rule_update, apply_template_update, detect_critical_mapping_change,
    detect_critical_rule_change, detect_critical_template_change, MappingUpdate, RuleUpdate,
    TemplateUpdate,
};
use super::repository::{
    AuditError, AuditLog, ConfigRepository, EvaluationNotice, NotificationPublisher,
    ReportRepository, RepositoryError, SiteRepository,
};
use crate::scoring::ScoringStatus;

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SIGNATURE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

fn next_signature_id() -> String {
    let id = SIGNATURE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("sig-{id:06}")
}

/// Inputs for one report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReportRequest {
    pub site_id: SiteId,
    pub generated_by_user_id: String,
    pub category_scores: BTreeMap<String, f64>,
    pub scoring_status: ScoringStatus,
    pub global_score: u8,
}

/// Inputs for acknowledging (signing and locking) a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgeRequest {
    pub signed_by_name: String,
    pub signed_by_role: String,
    pub hash_verification: String,
}

/// Service orchestrating report generation, acknowledgment, and the audit
/// trail around both.
pub struct ReportService<S, R, C, L, N> {
    sites: Arc<S>,
    reports: Arc<R>,
    config: Arc<C>,
    audit: Arc<L>,
    notifier: Arc<N>,
}

impl<S, R, C, L, N> ReportService<S, R, C, L, N>
where
    S: SiteRepository + 'static,
    R: ReportRepository + 'static,
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        sites: Arc<S>,
        reports: Arc<R>,
        config: Arc<C>,
        audit: Arc<L>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            sites,
            reports,
            config,
            audit,
            notifier,
        }
    }

    /// Generate and persist a new report for a site, snapshotting the live
    /// configuration as of now.
    pub fn generate(
        &self,
        request: GenerateReportRequest,
        actor: ActorContext,
    ) -> Result<Report, ReportServiceError> {
        validate_generate_request(&request)?;

        let site = self
            .sites
            .fetch_site(&request.site_id)?
            .ok_or(ReportServiceError::NotFound("site"))?;

        let snapshot = ConfigSnapshot {
            rules: self.config.active_rules()?,
            templates: self.config.templates()?,
            domains: self.config.domains()?,
            mappings: self.config.mappings()?,
        };

        let history = self.reports.report_history(&request.site_id)?;
        let generated_at = Utc::now();

        let report = assemble_report(
            next_report_id(),
            request.site_id.clone(),
            request.generated_by_user_id.clone(),
            ScoreSnapshot {
                global_score: request.global_score,
                scoring_status: request.scoring_status,
                category_scores: request.category_scores.clone(),
            },
            snapshot,
            PriorReports {
                count: history.len() as u32,
                latest: history.last().cloned(),
            },
            generated_at,
        )?;

        let stored = self.reports.insert_report(report)?;

        self.audit.append(AuditLogEntry {
            entity_type: AuditEntityType::Report,
            entity_id: stored.id.0.clone(),
            action: AuditAction::Generated,
            actor,
            before_state: None,
            after_state: Some(serde_json::json!({
                "report_version": stored.report_version,
                "final_status": stored.final_status,
                "hash_sha256": stored.hash_sha256,
            })),
            is_critical_change: false,
            change_reason: None,
            created_at: generated_at,
        })?;

        info!(
            site = %site.name,
            version = %stored.report_version,
            status = stored.final_status.label(),
            "evaluation report generated"
        );

        let notice = EvaluationNotice {
            template: "evaluation_complete".to_string(),
            site_id: stored.site_id.clone(),
            report_id: stored.id.clone(),
            report_version: stored.report_version.clone(),
            final_status: stored.final_status,
        };
        if let Err(err) = self.notifier.publish(notice) {
            warn!(report = %stored.id.0, "evaluation notification failed: {err}");
        }

        Ok(stored)
    }

    /// Acknowledge a report: verify the presented hash, lock it (first wins),
    /// and record the signature.
    pub fn acknowledge(
        &self,
        report_id: &ReportId,
        request: AcknowledgeRequest,
        actor: ActorContext,
    ) -> Result<ReportSignature, ReportServiceError> {
        let report = self
            .reports
            .fetch_report(report_id)?
            .ok_or(ReportServiceError::NotFound("report"))?;

        if report.is_locked {
            return Err(ReportServiceError::AlreadyLocked);
        }

        if request.hash_verification != report.hash_sha256 {
            return Err(ReportServiceError::IntegrityMismatch {
                expected: report.hash_sha256,
                provided: request.hash_verification,
            });
        }

        if !self.reports.lock_if_unlocked(report_id)? {
            return Err(ReportServiceError::AlreadyLocked);
        }

        let signed_at = Utc::now();
        let signature = self.reports.insert_signature(ReportSignature {
            id: next_signature_id(),
            report_id: report_id.clone(),
            signed_by_name: request.signed_by_name,
            signed_by_role: request.signed_by_role,
            ip_address: actor.ip_address.clone(),
            user_agent: actor.user_agent.clone(),
            hash_at_signature: report.hash_sha256.clone(),
            signature_method: "acknowledgment".to_string(),
            signature_payload: request.hash_verification,
            signed_at,
        })?;

        self.audit.append(AuditLogEntry {
            entity_type: AuditEntityType::Report,
            entity_id: report_id.0.clone(),
            action: AuditAction::Acknowledged,
            actor,
            before_state: Some(serde_json::json!({ "is_locked": false })),
            after_state: Some(serde_json::json!({
                "is_locked": true,
                "signed_by": signature.signed_by_name,
            })),
            is_critical_change: false,
            change_reason: None,
            created_at: signed_at,
        })?;

        info!(
            report = %report.report_version,
            signer = %signature.signed_by_name,
            "report acknowledged and locked"
        );

        Ok(signature)
    }

    /// Fetch a report for display or hash re-verification.
    pub fn report(&self, report_id: &ReportId) -> Result<Report, ReportServiceError> {
        self.reports
            .fetch_report(report_id)?
            .ok_or(ReportServiceError::NotFound("report"))
    }
}

fn validate_generate_request(request: &GenerateReportRequest) -> Result<(), ReportServiceError> {
    if request.site_id.0.trim().is_empty() {
        return Err(ReportServiceError::Validation(
            "site_id must not be empty".to_string(),
        ));
    }
    if request.generated_by_user_id.trim().is_empty() {
        return Err(ReportServiceError::Validation(
            "generated_by_user_id must not be empty".to_string(),
        ));
    }
    if request.global_score > 100 {
        return Err(ReportServiceError::Validation(
            "global_score must be within 0-100".to_string(),
        ));
    }
    for (category, score) in &request.category_scores {
        if !score.is_finite() || *score < 0.0 || *score > 100.0 {
            return Err(ReportServiceError::Validation(format!(
                "category score for '{category}' must be within 0-100"
            )));
        }
    }
    Ok(())
}

/// Service applying guarded updates to the rule/template/mapping
/// configuration that feeds the report pipeline.
pub struct AdminConfigService<C, L> {
    config: Arc<C>,
    audit: Arc<L>,
}

impl<C, L> AdminConfigService<C, L>
where
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
{
    pub fn new(config: Arc<C>, audit: Arc<L>) -> Self {
        Self { config, audit }
    }

    pub fn update_rule(
        &self,
        id: &RuleId,
        updates: RuleUpdate,
        change_reason: Option<String>,
        actor: ActorContext,
    ) -> Result<AdminRule, ReportServiceError> {
        let existing = self
            .config
            .fetch_rule(id)?
            .ok_or(ReportServiceError::NotFound("admin rule"))?;

        let is_critical = detect_critical_rule_change(&existing, &updates);
        let change_reason = require_reason_if_critical(
            is_critical,
            change_reason,
            "admin_rule",
            "the update reduces the rule's strictness",
        )?;

        let updated = apply_rule_update(&existing, &updates);
        let stored = self.config.update_rule(updated)?;

        self.append_update_audit(
            AuditEntityType::AdminRule,
            existing.id.0.clone(),
            serde_json::to_value(&existing)?,
            serde_json::to_value(&stored)?,
            is_critical,
            change_reason,
            actor,
        )?;

        Ok(stored)
    }

    pub fn update_template(
        &self,
        id: &TemplateId,
        updates: TemplateUpdate,
        change_reason: Option<String>,
        actor: ActorContext,
    ) -> Result<ReportTemplate, ReportServiceError> {
        let existing = self
            .config
            .fetch_template(id)?
            .ok_or(ReportServiceError::NotFound("report template"))?;

        let is_critical = detect_critical_template_change(&existing, &updates);
        let change_reason = require_reason_if_critical(
            is_critical,
            change_reason,
            "report_template",
            "the update rewrites the Not Approved executive summary",
        )?;

        let updated = apply_template_update(&existing, &updates);
        let stored = self.config.update_template(updated)?;

        self.append_update_audit(
            AuditEntityType::ReportTemplate,
            existing.id.0.clone(),
            serde_json::to_value(&existing)?,
            serde_json::to_value(&stored)?,
            is_critical,
            change_reason,
            actor,
        )?;

        Ok(stored)
    }

    pub fn update_mapping(
        &self,
        id: &MappingId,
        updates: MappingUpdate,
        change_reason: Option<String>,
        actor: ActorContext,
    ) -> Result<ScoreStatusMapping, ReportServiceError> {
        let existing = self
            .config
            .fetch_mapping(id)?
            .ok_or(ReportServiceError::NotFound("score mapping"))?;

        let is_critical = detect_critical_mapping_change(&existing, &updates);
        let change_reason = require_reason_if_critical(
            is_critical,
            change_reason,
            "score_mapping",
            "the update widens the Adequate band",
        )?;

        let updated = apply_mapping_update(&existing, &updates);
        let stored = self.config.update_mapping(updated)?;

        self.append_update_audit(
            AuditEntityType::ScoreMapping,
            existing.id.0.clone(),
            serde_json::to_value(&existing)?,
            serde_json::to_value(&stored)?,
            is_critical,
            change_reason,
            actor,
        )?;

        Ok(stored)
    }

    #[allow(clippy::too_many_arguments)]
    fn append_update_audit(
        &self,
        entity_type: AuditEntityType,
        entity_id: String,
        before_state: serde_json::Value,
        after_state: serde_json::Value,
        is_critical_change: bool,
        change_reason: Option<String>,
        actor: ActorContext,
    ) -> Result<(), ReportServiceError> {
        self.audit.append(AuditLogEntry {
            entity_type,
            entity_id,
            action: AuditAction::Updated,
            actor,
            before_state: Some(before_state),
            after_state: Some(after_state),
            is_critical_change,
            change_reason,
            created_at: Utc::now(),
        })?;
        Ok(())
    }
}

fn require_reason_if_critical(
    is_critical: bool,
    change_reason: Option<String>,
    entity: &'static str,
    detail: &str,
) -> Result<Option<String>, ReportServiceError> {
    match change_reason {
        Some(reason) if !reason.trim().is_empty() => Ok(Some(reason)),
        _ if is_critical => Err(ReportServiceError::CriticalChangeRejected {
            entity,
            detail: detail.to_string(),
        }),
        other => Ok(other.filter(|reason| !reason.trim().is_empty())),
    }
}

/// Error raised by the report and admin-config services.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("hash verification failed (expected {expected}, provided {provided})")]
    IntegrityMismatch { expected: String, provided: String },
    #[error("report is already locked")]
    AlreadyLocked,
    #[error("critical {entity} change requires a change reason: {detail}")]
    CriticalChangeRejected { entity: &'static str, detail: String },
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
