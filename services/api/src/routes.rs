use crate::infra::{is_safe_report_name, ApiService, AppState};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Extension;
use axum::Json;
use loan_eligibility::error::AppError;
use loan_eligibility::workflows::eligibility::eligibility_router;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_application_routes(service: Arc<ApiService>) -> axum::Router {
    eligibility_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/reports/:filename", get(report_endpoint))
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

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_safe_report_name(&filename) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid report name" })),
        )
            .into_response());
    }

    let path = state.report_dir.join(&filename);
    let contents = match tokio::fs::read(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "File not found" })),
            )
                .into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();
    let disposition = format!("inline; filename=\"{filename}\"");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.essence_str().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        contents,
    )
        .into_response())
}
