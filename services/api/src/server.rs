use crate::cli::ServeArgs;
use crate::infra::{
    seed_sites, AppState, InMemoryAuditLog, InMemoryConfigRepository, InMemoryReportRepository,
    InMemorySiteRepository, LoggingNotificationPublisher,
};
use crate::routes::with_core_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use siteval::config::AppConfig;
use siteval::error::AppError;
use siteval::reporting::{AdminConfigService, ReportService};
use siteval::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sites = Arc::new(InMemorySiteRepository::seeded(seed_sites()));
    let reports = Arc::new(InMemoryReportRepository::default());
    let evaluation_config = Arc::new(InMemoryConfigRepository::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let notifier = Arc::new(LoggingNotificationPublisher::default());

    let report_service = Arc::new(ReportService::new(
        sites,
        reports,
        evaluation_config.clone(),
        audit.clone(),
        notifier,
    ));
    let admin_service = Arc::new(AdminConfigService::new(evaluation_config, audit));

    let app = with_core_routes(report_service, admin_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "clinical site evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
