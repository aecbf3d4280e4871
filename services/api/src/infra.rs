use loan_eligibility::config::{AppConfig, SessionConfig};
use loan_eligibility::workflows::eligibility::{
    EligibilityService, InMemorySessionStore, MarkdownReportAssembler,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

pub(crate) type ApiService = EligibilityService<InMemorySessionStore, MarkdownReportAssembler>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) report_dir: Arc<PathBuf>,
}

pub(crate) fn session_ttl(sessions: &SessionConfig) -> chrono::Duration {
    chrono::Duration::from_std(sessions.ttl).unwrap_or_else(|_| chrono::Duration::minutes(30))
}

pub(crate) fn build_service(config: &AppConfig) -> Arc<ApiService> {
    let store = Arc::new(InMemorySessionStore::new(session_ttl(&config.sessions)));
    let assembler = Arc::new(MarkdownReportAssembler::new(config.reports.dir.clone()));
    Arc::new(EligibilityService::new(
        store,
        assembler,
        config.sessions.coercion,
    ))
}

/// Periodically evicts idle dialogue sessions until the task is aborted.
pub(crate) fn spawn_session_sweeper(service: Arc<ApiService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = service.expire_sessions(chrono::Utc::now()) {
                warn!(error = %err, "session sweep failed");
            }
        }
    })
}

/// Report files are flat names produced by the assembler; anything that could
/// address another directory is refused.
pub(crate) fn is_safe_report_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        && !name.contains("..")
}
