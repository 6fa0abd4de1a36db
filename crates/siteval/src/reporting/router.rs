use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ActorContext, MappingId, ReportId, RuleId, SiteId, TemplateId};
use super::guard::{MappingUpdate, RuleUpdate, TemplateUpdate};
use super::repository::{
    AuditLog, ConfigRepository, NotificationPublisher, ReportRepository, SiteRepository,
};
use super::service::{
    AcknowledgeRequest, AdminConfigService, GenerateReportRequest, ReportService,
    ReportServiceError,
};
use crate::scoring::{AnswerSheet, Question, ScoringEngine, ScoringModelConfig, ScoringStatus};

/// Router builder exposing report generation, acknowledgment, and the
/// what-if scoring simulation.
pub fn report_router<S, R, C, L, N>(service: Arc<ReportService<S, R, C, L, N>>) -> Router
where
    S: SiteRepository + 'static,
    R: ReportRepository + 'static,
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(generate_handler::<S, R, C, L, N>))
        .route(
            "/api/v1/reports/:report_id",
            get(fetch_handler::<S, R, C, L, N>),
        )
        .route(
            "/api/v1/reports/:report_id/acknowledge",
            post(acknowledge_handler::<S, R, C, L, N>),
        )
        .route("/api/v1/scoring/simulate", post(simulate_handler))
        .with_state(service)
}

/// Router builder exposing the guarded configuration PATCH endpoints.
pub fn admin_router<C, L>(service: Arc<AdminConfigService<C, L>>) -> Router
where
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/rules/:rule_id",
            patch(update_rule_handler::<C, L>),
        )
        .route(
            "/api/v1/admin/templates/:template_id",
            patch(update_template_handler::<C, L>),
        )
        .route(
            "/api/v1/admin/mappings/:mapping_id",
            patch(update_mapping_handler::<C, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateReportBody {
    pub site_id: String,
    pub generated_by_user_id: String,
    pub generated_by_name: String,
    pub category_scores: BTreeMap<String, f64>,
    pub scoring_status: ScoringStatus,
    pub global_score: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcknowledgeBody {
    pub signed_by_name: String,
    pub signed_by_role: String,
    pub hash_verification: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleUpdateBody {
    pub updates: RuleUpdate,
    #[serde(default)]
    pub change_reason: Option<String>,
    #[serde(default)]
    pub actor_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateUpdateBody {
    pub updates: TemplateUpdate,
    #[serde(default)]
    pub change_reason: Option<String>,
    #[serde(default)]
    pub actor_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MappingUpdateBody {
    pub updates: MappingUpdate,
    #[serde(default)]
    pub change_reason: Option<String>,
    #[serde(default)]
    pub actor_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimulateScoringBody {
    pub questions: Vec<Question>,
    pub answers: AnswerSheet,
    #[serde(default)]
    pub config: Option<ScoringModelConfig>,
}

fn actor_from_headers(headers: &HeaderMap, user_id: Option<String>, name: String) -> ActorContext {
    let header_text = |key: &str| {
        headers
            .get(key)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string()
    };

    ActorContext {
        user_id,
        name,
        ip_address: header_text("x-forwarded-for"),
        user_agent: header_text("user-agent"),
    }
}

fn error_response(error: ReportServiceError) -> Response {
    match &error {
        ReportServiceError::Validation(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ReportServiceError::NotFound(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ReportServiceError::IntegrityMismatch { expected, provided } => {
            let payload = json!({
                "error": "hash verification failed",
                "expected": expected,
                "provided": provided,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        ReportServiceError::AlreadyLocked => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ReportServiceError::CriticalChangeRejected { .. } => {
            let payload = json!({
                "error": error.to_string(),
                "is_critical": true,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        ReportServiceError::Snapshot(_)
        | ReportServiceError::Repository(_)
        | ReportServiceError::Audit(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn generate_handler<S, R, C, L, N>(
    State(service): State<Arc<ReportService<S, R, C, L, N>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<GenerateReportBody>,
) -> Response
where
    S: SiteRepository + 'static,
    R: ReportRepository + 'static,
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = actor_from_headers(
        &headers,
        Some(body.generated_by_user_id.clone()),
        body.generated_by_name.clone(),
    );
    let request = GenerateReportRequest {
        site_id: SiteId(body.site_id),
        generated_by_user_id: body.generated_by_user_id,
        category_scores: body.category_scores,
        scoring_status: body.scoring_status,
        global_score: body.global_score,
    };

    match service.generate(request, actor) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S, R, C, L, N>(
    State(service): State<Arc<ReportService<S, R, C, L, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    S: SiteRepository + 'static,
    R: ReportRepository + 'static,
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.report(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn acknowledge_handler<S, R, C, L, N>(
    State(service): State<Arc<ReportService<S, R, C, L, N>>>,
    Path(report_id): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<AcknowledgeBody>,
) -> Response
where
    S: SiteRepository + 'static,
    R: ReportRepository + 'static,
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = actor_from_headers(&headers, None, body.signed_by_name.clone());
    let request = AcknowledgeRequest {
        signed_by_name: body.signed_by_name,
        signed_by_role: body.signed_by_role,
        hash_verification: body.hash_verification,
    };

    match service.acknowledge(&ReportId(report_id), request, actor) {
        Ok(signature) => {
            let payload = json!({ "signature": signature, "locked": true });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Score an answer sheet against submitted questions and an optional draft
/// configuration, without persisting anything. Lets admins compare a draft
/// scoring model against the live default over the same answers.
pub(crate) async fn simulate_handler(
    axum::Json(body): axum::Json<SimulateScoringBody>,
) -> Response {
    let engine = ScoringEngine::new(body.config.unwrap_or_default());
    let outcome = engine.score(&body.answers, &body.questions);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn update_rule_handler<C, L>(
    State(service): State<Arc<AdminConfigService<C, L>>>,
    Path(rule_id): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<RuleUpdateBody>,
) -> Response
where
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
{
    let actor = actor_from_headers(
        &headers,
        None,
        body.actor_name.unwrap_or_else(|| "unknown".to_string()),
    );

    match service.update_rule(&RuleId(rule_id), body.updates, body.change_reason, actor) {
        Ok(rule) => (StatusCode::OK, axum::Json(rule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_template_handler<C, L>(
    State(service): State<Arc<AdminConfigService<C, L>>>,
    Path(template_id): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<TemplateUpdateBody>,
) -> Response
where
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
{
    let actor = actor_from_headers(
        &headers,
        None,
        body.actor_name.unwrap_or_else(|| "unknown".to_string()),
    );

    match service.update_template(
        &TemplateId(template_id),
        body.updates,
        body.change_reason,
        actor,
    ) {
        Ok(template) => (StatusCode::OK, axum::Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_mapping_handler<C, L>(
    State(service): State<Arc<AdminConfigService<C, L>>>,
    Path(mapping_id): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<MappingUpdateBody>,
) -> Response
where
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
{
    let actor = actor_from_headers(
        &headers,
        None,
        body.actor_name.unwrap_or_else(|| "unknown".to_string()),
    );

    match service.update_mapping(
        &MappingId(mapping_id),
        body.updates,
        body.change_reason,
        actor,
    ) {
        Ok(mapping) => (StatusCode::OK, axum::Json(mapping)).into_response(),
        Err(error) => error_response(error),
    }
}
