//! Report-decision pipeline: rule evaluation, CAPA derivation, snapshot
//! assembly, hash-anchored acknowledgment, and the critical-change guard
//! around the configuration that feeds all of it.

pub mod assembler;
pub(crate) mod capa;
pub mod domain;
pub(crate) mod guard;
pub mod integrity;
pub mod repository;
pub mod router;
pub(crate) mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use assembler::{assemble_report, ConfigSnapshot, PriorReports};
pub use capa::generate_capa_items;
pub use domain::{
    ActorContext, AdminRule, AuditAction, AuditEntityType, AuditLogEntry, CapaItem,
    DomainEvaluation, EvaluationDomain, FinalStatus, MappingId, NarrativeSnapshot,
    QualitativeLabel, Report, ReportId, ReportSignature, ReportTemplate, RuleId, ScoreSnapshot,
    ScoreStatusMapping, Site, SiteId, TemplateId, TriggerCondition,
};
pub use guard::{
    detect_critical_mapping_change, detect_critical_rule_change, detect_critical_template_change,
    MappingUpdate, RuleUpdate, TemplateUpdate,
};
pub use integrity::{compute_report_hash, ReportHashPayload};
pub use repository::{
    AuditError, AuditLog, ConfigRepository, EvaluationNotice, NotificationError,
    NotificationPublisher, ReportRepository, RepositoryError, SiteRepository,
};
pub use router::{admin_router, report_router};
pub use rules::{determine_final_status, resolve_score_label, RuleEvaluation};
pub use service::{
    AcknowledgeRequest, AdminConfigService, GenerateReportRequest, ReportService,
    ReportServiceError,
};
