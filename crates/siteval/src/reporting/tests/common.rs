use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::reporting::domain::{
    ActorContext, AdminRule, AuditLogEntry, EvaluationDomain, FinalStatus, MappingId,
    QualitativeLabel, Report, ReportId, ReportSignature, ReportTemplate, RuleId,
    ScoreStatusMapping, Site, SiteId, TemplateId, TriggerCondition,
};
use crate::reporting::repository::{
    AuditError, AuditLog, ConfigRepository, EvaluationNotice, NotificationError,
    NotificationPublisher, ReportRepository, RepositoryError, SiteRepository,
};
use crate::reporting::service::{AdminConfigService, GenerateReportRequest, ReportService};
use crate::scoring::ScoringStatus;

pub(super) fn actor() -> ActorContext {
    ActorContext {
        user_id: Some("user-001".to_string()),
        name: "Dra. Elena Vargas".to_string(),
        ip_address: "203.0.113.10".to_string(),
        user_agent: "siteval-tests".to_string(),
    }
}

pub(super) fn site() -> Site {
    Site {
        id: SiteId("site-centro-norte".to_string()),
        name: "Centro Clinico Norte".to_string(),
    }
}

pub(super) fn domains() -> Vec<EvaluationDomain> {
    vec![
        EvaluationDomain {
            domain_key: "patient_safety".to_string(),
            display_name: "Patient Safety".to_string(),
            description: "Incident handling and pharmacovigilance".to_string(),
            display_order: 1,
            visible_in_report: true,
        },
        EvaluationDomain {
            domain_key: "quality_management".to_string(),
            display_name: "Quality Management".to_string(),
            description: "SOPs, training records, and CAPA history".to_string(),
            display_order: 2,
            visible_in_report: true,
        },
        EvaluationDomain {
            domain_key: "staff".to_string(),
            display_name: "Staff".to_string(),
            description: "Investigator and coordinator coverage".to_string(),
            display_order: 3,
            visible_in_report: true,
        },
        EvaluationDomain {
            domain_key: "internal_notes".to_string(),
            display_name: "Internal Notes".to_string(),
            description: "Monitor-only observations".to_string(),
            display_order: 4,
            visible_in_report: false,
        },
    ]
}

pub(super) fn rule(
    id: &str,
    domain_key: &str,
    trigger: TriggerCondition,
    priority: i32,
) -> AdminRule {
    AdminRule {
        id: RuleId(id.to_string()),
        domain_key: domain_key.to_string(),
        trigger,
        priority,
        forces_minimum_status: None,
        blocks_approval: false,
        requires_capa: false,
        required_action: String::new(),
        evidence_required: String::new(),
        recommended_timeline_days: None,
        active: true,
        version: 1,
    }
}

pub(super) fn blocking_rule(id: &str, domain_key: &str) -> AdminRule {
    AdminRule {
        forces_minimum_status: Some(FinalStatus::NotApproved),
        blocks_approval: true,
        requires_capa: true,
        required_action: "Remediate the gap and retrain staff".to_string(),
        evidence_required: "Signed retraining log".to_string(),
        recommended_timeline_days: Some(30),
        ..rule(id, domain_key, TriggerCondition::AnyGap, 100)
    }
}

pub(super) fn mappings() -> Vec<ScoreStatusMapping> {
    vec![
        ScoreStatusMapping {
            id: MappingId("map-adequate".to_string()),
            min_score: 80,
            max_score: 100,
            label: QualitativeLabel::Adequate,
        },
        ScoreStatusMapping {
            id: MappingId("map-partial".to_string()),
            min_score: 50,
            max_score: 79,
            label: QualitativeLabel::PartiallyAdequate,
        },
        ScoreStatusMapping {
            id: MappingId("map-gap".to_string()),
            min_score: 25,
            max_score: 49,
            label: QualitativeLabel::CriticalGap,
        },
        ScoreStatusMapping {
            id: MappingId("map-none".to_string()),
            min_score: 0,
            max_score: 24,
            label: QualitativeLabel::NotEvidenced,
        },
    ]
}

pub(super) fn templates() -> Vec<ReportTemplate> {
    let statuses = [
        (
            "tpl-approved",
            FinalStatus::Approved,
            "The site meets the evaluation criteria.",
        ),
        (
            "tpl-conditional",
            FinalStatus::ConditionallyApproved,
            "The site may proceed subject to the corrective actions below.",
        ),
        (
            "tpl-rejected",
            FinalStatus::NotApproved,
            "The site does not meet the evaluation criteria.",
        ),
    ];

    statuses
        .into_iter()
        .map(|(id, status_type, summary)| ReportTemplate {
            id: TemplateId(id.to_string()),
            status_type,
            executive_summary: summary.to_string(),
            reevaluation_clause: "A re-evaluation may be requested after 90 days.".to_string(),
            domain_paragraphs: BTreeMap::new(),
        })
        .collect()
}

pub(super) fn category_scores(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(key, score)| (key.to_string(), *score))
        .collect()
}

pub(super) fn generate_request(scores: &[(&str, f64)]) -> GenerateReportRequest {
    GenerateReportRequest {
        site_id: site().id,
        generated_by_user_id: "user-001".to_string(),
        category_scores: category_scores(scores),
        scoring_status: ScoringStatus::Approved,
        global_score: 85,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySites {
    sites: Arc<Mutex<HashMap<SiteId, Site>>>,
}

impl MemorySites {
    pub(super) fn with_site(site: Site) -> Self {
        let repository = Self::default();
        repository
            .sites
            .lock()
            .expect("site mutex poisoned")
            .insert(site.id.clone(), site);
        repository
    }
}

impl SiteRepository for MemorySites {
    fn fetch_site(&self, id: &SiteId) -> Result<Option<Site>, RepositoryError> {
        let guard = self.sites.lock().expect("site mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
struct ReportStore {
    reports: HashMap<ReportId, Report>,
    history: HashMap<SiteId, Vec<ReportId>>,
    signatures: Vec<ReportSignature>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryReports {
    store: Arc<Mutex<ReportStore>>,
}

impl MemoryReports {
    pub(super) fn signatures(&self) -> Vec<ReportSignature> {
        self.store
            .lock()
            .expect("report mutex poisoned")
            .signatures
            .clone()
    }
}

impl ReportRepository for MemoryReports {
    fn insert_report(&self, report: Report) -> Result<Report, RepositoryError> {
        let mut guard = self.store.lock().expect("report mutex poisoned");
        if guard.reports.contains_key(&report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard
            .history
            .entry(report.site_id.clone())
            .or_default()
            .push(report.id.clone());
        guard.reports.insert(report.id.clone(), report.clone());
        Ok(report)
    }

    fn fetch_report(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        let guard = self.store.lock().expect("report mutex poisoned");
        Ok(guard.reports.get(id).cloned())
    }

    fn report_history(&self, site: &SiteId) -> Result<Vec<ReportId>, RepositoryError> {
        let guard = self.store.lock().expect("report mutex poisoned");
        Ok(guard.history.get(site).cloned().unwrap_or_default())
    }

    fn lock_if_unlocked(&self, id: &ReportId) -> Result<bool, RepositoryError> {
        let mut guard = self.store.lock().expect("report mutex poisoned");
        let report = guard.reports.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if report.is_locked {
            Ok(false)
        } else {
            report.is_locked = true;
            Ok(true)
        }
    }

    fn insert_signature(
        &self,
        signature: ReportSignature,
    ) -> Result<ReportSignature, RepositoryError> {
        let mut guard = self.store.lock().expect("report mutex poisoned");
        guard.signatures.push(signature.clone());
        Ok(signature)
    }
}

#[derive(Clone)]
pub(super) struct MemoryConfig {
    rules: Arc<Mutex<Vec<AdminRule>>>,
    templates: Arc<Mutex<Vec<ReportTemplate>>>,
    domains: Arc<Mutex<Vec<EvaluationDomain>>>,
    mappings: Arc<Mutex<Vec<ScoreStatusMapping>>>,
}

impl MemoryConfig {
    pub(super) fn seeded(rules: Vec<AdminRule>) -> Self {
        Self {
            rules: Arc::new(Mutex::new(rules)),
            templates: Arc::new(Mutex::new(templates())),
            domains: Arc::new(Mutex::new(domains())),
            mappings: Arc::new(Mutex::new(mappings())),
        }
    }
}

impl ConfigRepository for MemoryConfig {
    fn active_rules(&self) -> Result<Vec<AdminRule>, RepositoryError> {
        let guard = self.rules.lock().expect("config mutex poisoned");
        Ok(guard.iter().filter(|rule| rule.active).cloned().collect())
    }

    fn fetch_rule(&self, id: &RuleId) -> Result<Option<AdminRule>, RepositoryError> {
        let guard = self.rules.lock().expect("config mutex poisoned");
        Ok(guard.iter().find(|rule| &rule.id == id).cloned())
    }

    fn update_rule(&self, rule: AdminRule) -> Result<AdminRule, RepositoryError> {
        let mut guard = self.rules.lock().expect("config mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|candidate| candidate.id == rule.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = rule.clone();
        Ok(rule)
    }

    fn templates(&self) -> Result<Vec<ReportTemplate>, RepositoryError> {
        Ok(self.templates.lock().expect("config mutex poisoned").clone())
    }

    fn fetch_template(&self, id: &TemplateId) -> Result<Option<ReportTemplate>, RepositoryError> {
        let guard = self.templates.lock().expect("config mutex poisoned");
        Ok(guard.iter().find(|template| &template.id == id).cloned())
    }

    fn update_template(
        &self,
        template: ReportTemplate,
    ) -> Result<ReportTemplate, RepositoryError> {
        let mut guard = self.templates.lock().expect("config mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|candidate| candidate.id == template.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = template.clone();
        Ok(template)
    }

    fn domains(&self) -> Result<Vec<EvaluationDomain>, RepositoryError> {
        Ok(self.domains.lock().expect("config mutex poisoned").clone())
    }

    fn mappings(&self) -> Result<Vec<ScoreStatusMapping>, RepositoryError> {
        Ok(self.mappings.lock().expect("config mutex poisoned").clone())
    }

    fn fetch_mapping(&self, id: &MappingId) -> Result<Option<ScoreStatusMapping>, RepositoryError> {
        let guard = self.mappings.lock().expect("config mutex poisoned");
        Ok(guard.iter().find(|mapping| &mapping.id == id).cloned())
    }

    fn update_mapping(
        &self,
        mapping: ScoreStatusMapping,
    ) -> Result<ScoreStatusMapping, RepositoryError> {
        let mut guard = self.mappings.lock().expect("config mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|candidate| candidate.id == mapping.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = mapping.clone();
        Ok(mapping)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    entries: Arc<Mutex<Vec<AuditLogEntry>>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLog for MemoryAudit {
    fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<EvaluationNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<EvaluationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotices {
    fn publish(&self, notice: EvaluationNotice) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingNotices;

impl NotificationPublisher for FailingNotices {
    fn publish(&self, _notice: EvaluationNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

pub(super) type TestReportService =
    ReportService<MemorySites, MemoryReports, MemoryConfig, MemoryAudit, MemoryNotices>;

pub(super) fn build_report_service(
    rules: Vec<AdminRule>,
) -> (
    TestReportService,
    Arc<MemoryReports>,
    Arc<MemoryAudit>,
    Arc<MemoryNotices>,
) {
    let sites = Arc::new(MemorySites::with_site(site()));
    let reports = Arc::new(MemoryReports::default());
    let config = Arc::new(MemoryConfig::seeded(rules));
    let audit = Arc::new(MemoryAudit::default());
    let notices = Arc::new(MemoryNotices::default());

    let service = ReportService::new(
        sites,
        reports.clone(),
        config,
        audit.clone(),
        notices.clone(),
    );
    (service, reports, audit, notices)
}

pub(super) fn build_admin_service(
    rules: Vec<AdminRule>,
) -> (
    AdminConfigService<MemoryConfig, MemoryAudit>,
    Arc<MemoryConfig>,
    Arc<MemoryAudit>,
) {
    let config = Arc::new(MemoryConfig::seeded(rules));
    let audit = Arc::new(MemoryAudit::default());
    let service = AdminConfigService::new(config.clone(), audit.clone());
    (service, config, audit)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
