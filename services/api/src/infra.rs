use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use siteval::reporting::{
    AdminRule, AuditError, AuditLog, AuditLogEntry, ConfigRepository, EvaluationDomain,
    EvaluationNotice, FinalStatus, MappingId, NotificationError, NotificationPublisher,
    QualitativeLabel, Report, ReportId, ReportRepository, ReportSignature, ReportTemplate,
    RepositoryError, RuleId, ScoreStatusMapping, Site, SiteId, SiteRepository, TemplateId,
    TriggerCondition,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySiteRepository {
    sites: Arc<Mutex<HashMap<SiteId, Site>>>,
}

impl InMemorySiteRepository {
    pub(crate) fn seeded(sites: Vec<Site>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.sites.lock().expect("site mutex poisoned");
            for site in sites {
                guard.insert(site.id.clone(), site);
            }
        }
        repository
    }
}

impl SiteRepository for InMemorySiteRepository {
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

/// In-memory report store. One mutex covers version history and lock state,
/// which satisfies the per-site serialization and atomic-lock contracts of
/// `ReportRepository`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    store: Arc<Mutex<ReportStore>>,
}

impl InMemoryReportRepository {
    pub(crate) fn signatures(&self) -> Vec<ReportSignature> {
        self.store
            .lock()
            .expect("report mutex poisoned")
            .signatures
            .clone()
    }
}

impl ReportRepository for InMemoryReportRepository {
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
pub(crate) struct InMemoryConfigRepository {
    rules: Arc<Mutex<Vec<AdminRule>>>,
    templates: Arc<Mutex<Vec<ReportTemplate>>>,
    domains: Arc<Mutex<Vec<EvaluationDomain>>>,
    mappings: Arc<Mutex<Vec<ScoreStatusMapping>>>,
}

impl Default for InMemoryConfigRepository {
    fn default() -> Self {
        Self {
            rules: Arc::new(Mutex::new(seed_rules())),
            templates: Arc::new(Mutex::new(seed_templates())),
            domains: Arc::new(Mutex::new(seed_domains())),
            mappings: Arc::new(Mutex::new(seed_mappings())),
        }
    }
}

impl ConfigRepository for InMemoryConfigRepository {
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
pub(crate) struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditLogEntry>>>,
}

impl InMemoryAuditLog {
    pub(crate) fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

/// Notification adapter standing in for the outbound mail sender. Deliveries
/// are logged; a real adapter would enqueue mail here.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationPublisher {
    events: Arc<Mutex<Vec<EvaluationNotice>>>,
}

impl LoggingNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<EvaluationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationPublisher for LoggingNotificationPublisher {
    fn publish(&self, notice: EvaluationNotice) -> Result<(), NotificationError> {
        info!(
            template = %notice.template,
            site = %notice.site_id.0,
            report = %notice.report_version,
            "evaluation notice dispatched"
        );
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(crate) fn seed_sites() -> Vec<Site> {
    vec![
        Site {
            id: SiteId("site-centro-norte".to_string()),
            name: "Centro Clinico Norte".to_string(),
        },
        Site {
            id: SiteId("site-hospital-del-valle".to_string()),
            name: "Hospital del Valle".to_string(),
        },
    ]
}

pub(crate) fn seed_domains() -> Vec<EvaluationDomain> {
    let domain = |key: &str, name: &str, description: &str, order: u32| EvaluationDomain {
        domain_key: key.to_string(),
        display_name: name.to_string(),
        description: description.to_string(),
        display_order: order,
        visible_in_report: true,
    };

    vec![
        domain(
            "Patient Safety",
            "Patient Safety",
            "Incident handling, pharmacovigilance, and emergency readiness",
            1,
        ),
        domain(
            "Quality Management",
            "Quality Management",
            "SOPs, training records, and historical CAPA closure",
            2,
        ),
        domain(
            "Staff",
            "Staff",
            "Investigator availability and coordinator coverage",
            3,
        ),
        domain(
            "Infrastructure",
            "Infrastructure",
            "Facilities, equipment calibration, and sample storage",
            4,
        ),
    ]
}

pub(crate) fn seed_rules() -> Vec<AdminRule> {
    vec![
        AdminRule {
            id: RuleId("rule-safety-gap".to_string()),
            domain_key: "Patient Safety".to_string(),
            trigger: TriggerCondition::AnyGap,
            priority: 100,
            forces_minimum_status: Some(FinalStatus::NotApproved),
            blocks_approval: true,
            requires_capa: true,
            required_action: "Implement and train the incident reporting SOP".to_string(),
            evidence_required: "Signed SOP with the site training log".to_string(),
            recommended_timeline_days: Some(45),
            active: true,
            version: 1,
        },
        AdminRule {
            id: RuleId("rule-quality-below".to_string()),
            domain_key: "Quality Management".to_string(),
            trigger: TriggerCondition::BelowAdequate,
            priority: 80,
            forces_minimum_status: Some(FinalStatus::ConditionallyApproved),
            blocks_approval: true,
            requires_capa: true,
            required_action: "Close the open quality findings".to_string(),
            evidence_required: "Updated quality manual and closure records".to_string(),
            recommended_timeline_days: Some(60),
            active: true,
            version: 1,
        },
        AdminRule {
            id: RuleId("rule-staff-gap".to_string()),
            domain_key: "Staff".to_string(),
            trigger: TriggerCondition::Exact(QualitativeLabel::CriticalGap),
            priority: 60,
            forces_minimum_status: Some(FinalStatus::ConditionallyApproved),
            blocks_approval: false,
            requires_capa: true,
            required_action: "Name a backup study coordinator".to_string(),
            evidence_required: "Delegation log listing the backup coordinator".to_string(),
            recommended_timeline_days: None,
            active: true,
            version: 1,
        },
    ]
}

pub(crate) fn seed_templates() -> Vec<ReportTemplate> {
    let template = |id: &str, status: FinalStatus, summary: &str, clause: &str| ReportTemplate {
        id: TemplateId(id.to_string()),
        status_type: status,
        executive_summary: summary.to_string(),
        reevaluation_clause: clause.to_string(),
        domain_paragraphs: BTreeMap::new(),
    };

    vec![
        template(
            "tpl-approved",
            FinalStatus::Approved,
            "The site meets the evaluation criteria and is approved for study conduct.",
            "Routine re-evaluation applies at the next annual cycle.",
        ),
        template(
            "tpl-conditional",
            FinalStatus::ConditionallyApproved,
            "The site may proceed subject to completion of the corrective actions listed below.",
            "A focused re-evaluation is required once all corrective actions close.",
        ),
        template(
            "tpl-rejected",
            FinalStatus::NotApproved,
            "The site does not meet the evaluation criteria and is not approved.",
            "A full re-evaluation may be requested no earlier than 90 days from this report.",
        ),
    ]
}

pub(crate) fn seed_mappings() -> Vec<ScoreStatusMapping> {
    let band = |id: &str, min: u8, max: u8, label: QualitativeLabel| ScoreStatusMapping {
        id: MappingId(id.to_string()),
        min_score: min,
        max_score: max,
        label,
    };

    vec![
        band("map-adequate", 80, 100, QualitativeLabel::Adequate),
        band("map-partial", 50, 79, QualitativeLabel::PartiallyAdequate),
        band("map-gap", 25, 49, QualitativeLabel::CriticalGap),
        band("map-none", 0, 24, QualitativeLabel::NotEvidenced),
    ]
}
