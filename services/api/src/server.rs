use crate::cli::ServeArgs;
use crate::infra::{build_service, spawn_session_sweeper, AppState};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_eligibility::config::AppConfig;
use loan_eligibility::error::AppError;
use loan_eligibility::telemetry;
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

    tokio::fs::create_dir_all(&config.reports.dir).await?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        report_dir: Arc::new(config.reports.dir.clone()),
    };

    let service = build_service(&config);
    let dialogue_policy = service.dialogue().policy();
    let session_ttl = service.dialogue().store().ttl();
    let sweeper = spawn_session_sweeper(service.clone(), config.sessions.sweep_interval);

    let app = with_application_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        report_dir = %config.reports.dir.display(),
        coercion = dialogue_policy.label(),
        session_ttl_secs = session_ttl.num_seconds(),
        "loan eligibility service ready"
    );

    let served = axum::serve(listener, app).await;
    sweeper.abort();
    served?;
    Ok(())
}
