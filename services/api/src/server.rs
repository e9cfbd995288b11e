use crate::cli::ServeArgs;
use crate::infra::{
    default_status_policy, standard_catalog, standard_roster, AppState,
    InMemoryApplicationRepository, InMemoryDocumentStore, InMemoryRoleSessions,
};
use crate::routes::{with_application_routes, CommissionState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use intern_track::config::AppConfig;
use intern_track::error::AppError;
use intern_track::telemetry;
use intern_track::workflows::internship::applications::InternshipApplicationService;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
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

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let documents = Arc::new(InMemoryDocumentStore::default());
    let catalog = Arc::new(Mutex::new(standard_catalog()));
    let application_service = Arc::new(InternshipApplicationService::new(
        catalog,
        repository,
        documents,
        default_status_policy(),
    ));

    let commission = CommissionState {
        roster: Arc::new(Mutex::new(standard_roster())),
        sessions: Arc::new(InMemoryRoleSessions::default()),
    };

    let app = with_application_routes(application_service, commission)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "internship application service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
