use serde::{Deserialize, Serialize};

use super::domain::{
    AdminRule, AuditLogEntry, EvaluationDomain, FinalStatus, MappingId, Report, ReportId,
    ReportSignature, ReportTemplate, RuleId, ScoreStatusMapping, Site, SiteId, TemplateId,
};

/// Lookup for evaluated sites; site CRUD is owned elsewhere.
pub trait SiteRepository: Send + Sync {
    fn fetch_site(&self, id: &SiteId) -> Result<Option<Site>, RepositoryError>;
}

/// Storage abstraction for report artifacts and signatures.
///
/// Implementations must serialize per-site inserts so report versions stay
/// monotonic under concurrent generation, and must make `lock_if_unlocked`
/// an atomic compare-and-set: exactly one caller wins the lock.
pub trait ReportRepository: Send + Sync {
    fn insert_report(&self, report: Report) -> Result<Report, RepositoryError>;
    fn fetch_report(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError>;
    /// Ids of previously generated reports for a site, oldest first.
    fn report_history(&self, site: &SiteId) -> Result<Vec<ReportId>, RepositoryError>;
    /// Atomically set `is_locked`. Returns false when the report was already
    /// locked; the caller must then refuse the acknowledgment.
    fn lock_if_unlocked(&self, id: &ReportId) -> Result<bool, RepositoryError>;
    fn insert_signature(
        &self,
        signature: ReportSignature,
    ) -> Result<ReportSignature, RepositoryError>;
}

/// Storage abstraction for the rule/template/domain/mapping configuration.
pub trait ConfigRepository: Send + Sync {
    fn active_rules(&self) -> Result<Vec<AdminRule>, RepositoryError>;
    fn fetch_rule(&self, id: &RuleId) -> Result<Option<AdminRule>, RepositoryError>;
    fn update_rule(&self, rule: AdminRule) -> Result<AdminRule, RepositoryError>;
    fn templates(&self) -> Result<Vec<ReportTemplate>, RepositoryError>;
    fn fetch_template(&self, id: &TemplateId) -> Result<Option<ReportTemplate>, RepositoryError>;
    fn update_template(&self, template: ReportTemplate)
        -> Result<ReportTemplate, RepositoryError>;
    fn domains(&self) -> Result<Vec<EvaluationDomain>, RepositoryError>;
    fn mappings(&self) -> Result<Vec<ScoreStatusMapping>, RepositoryError>;
    fn fetch_mapping(&self, id: &MappingId) -> Result<Option<ScoreStatusMapping>, RepositoryError>;
    fn update_mapping(
        &self,
        mapping: ScoreStatusMapping,
    ) -> Result<ScoreStatusMapping, RepositoryError>;
}

/// Append-only audit sink consumed by every mutating operation.
pub trait AuditLog: Send + Sync {
    fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError>;
}

/// Outbound notification hook (e.g. a mail adapter). Fire-and-forget:
/// callers log failures and keep going.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: EvaluationNotice) -> Result<(), NotificationError>;
}

/// Payload for evaluation-complete notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationNotice {
    pub template: String,
    pub site_id: SiteId,
    pub report_id: ReportId,
    pub report_version: String,
    pub final_status: FinalStatus,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Audit sink failure.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Notification dispatch failure.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
