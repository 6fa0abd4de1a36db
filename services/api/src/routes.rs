use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use siteval::reporting::{
    admin_router, report_router, AdminConfigService, AuditLog, ConfigRepository,
    NotificationPublisher, ReportRepository, ReportService, SiteRepository,
};

/// Mount the core evaluation routers plus the operational endpoints.
pub(crate) fn with_core_routes<S, R, C, L, N>(
    reports: Arc<ReportService<S, R, C, L, N>>,
    admin: Arc<AdminConfigService<C, L>>,
) -> axum::Router
where
    S: SiteRepository + 'static,
    R: ReportRepository + 'static,
    C: ConfigRepository + 'static,
    L: AuditLog + 'static,
    N: NotificationPublisher + 'static,
{
    report_router(reports)
        .merge(admin_router(admin))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
