use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::dialogue::store::SessionStore;
use super::dialogue::DialogueReply;
use super::domain::{ApplicantProfile, SessionId};
use super::fields::ProfileField;
use super::report::{ReportArtifact, ReportAssembler};
use super::scoring::{ScoreComponent, Verdict};
use super::service::{EligibilityService, EligibilityServiceError, SubmissionOutcome};

/// Router builder exposing submission and dialogue endpoints.
pub fn eligibility_router<S, A>(service: Arc<EligibilityService<S, A>>) -> Router
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    Router::new()
        .route(
            "/api/v1/eligibility/manual",
            post(submit_profile_handler::<S, A>),
        )
        .route(
            "/api/v1/eligibility/attributes",
            post(submit_attributes_handler::<S, A>),
        )
        .route("/api/v1/dialogue", post(dialogue_handler::<S, A>))
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialogueRequest {
    pub session_id: String,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Payload returned for manual and attribute submissions.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub status: &'static str,
    pub eligibility: &'static str,
    pub probability: f64,
    pub reasons: Vec<String>,
    pub components: Vec<ScoreComponent>,
    pub report_url: String,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DialogueResponse {
    InProgress {
        field: ProfileField,
        question: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
    Completed {
        eligibility: &'static str,
        probability: f64,
        reasons: Vec<String>,
        profile: ApplicantProfile,
        report_url: String,
    },
}

pub(crate) async fn submit_profile_handler<S, A>(
    State(service): State<Arc<EligibilityService<S, A>>>,
    Json(profile): Json<ApplicantProfile>,
) -> Response
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    let outcome = service.submit_profile(profile, Utc::now());
    respond_with_assessment(service, outcome).await
}

pub(crate) async fn submit_attributes_handler<S, A>(
    State(service): State<Arc<EligibilityService<S, A>>>,
    Json(attributes): Json<Map<String, Value>>,
) -> Response
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    let outcome = service.submit_attributes(&attributes, Utc::now());
    respond_with_assessment(service, outcome).await
}

pub(crate) async fn dialogue_handler<S, A>(
    State(service): State<Arc<EligibilityService<S, A>>>,
    Json(request): Json<DialogueRequest>,
) -> Response
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    let session_id = request.session_id.trim();
    if session_id.is_empty() {
        let payload = json!({ "error": "session_id must not be blank" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }
    let session_id = SessionId(session_id.to_string());

    let reply = match service.step(&session_id, request.answer.as_deref(), Utc::now()) {
        Ok(reply) => reply,
        Err(err) => return internal_error(err),
    };

    match reply {
        DialogueReply::InProgress {
            field,
            question,
            notice,
        } => {
            let body = DialogueResponse::InProgress {
                field,
                question,
                notice,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        DialogueReply::Completed(completed) => {
            let completed = *completed;
            let profile = completed.profile.clone();
            let verdict = completed.verdict.clone();
            match assemble_off_thread(service, completed.profile, completed.verdict).await {
                Ok(artifact) => {
                    let body = DialogueResponse::Completed {
                        eligibility: verdict.eligibility_label(),
                        probability: verdict.rounded_probability(),
                        reasons: verdict.reasons,
                        profile,
                        report_url: artifact.url(),
                    };
                    (StatusCode::OK, Json(body)).into_response()
                }
                Err(err) => assembly_failure(err, &verdict),
            }
        }
    }
}

async fn respond_with_assessment<S, A>(
    service: Arc<EligibilityService<S, A>>,
    outcome: Result<SubmissionOutcome, EligibilityServiceError>,
) -> Response
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    let SubmissionOutcome {
        session_id,
        profile,
        verdict,
    } = match outcome {
        Ok(outcome) => outcome,
        Err(err) => return internal_error(err),
    };

    match assemble_off_thread(service, profile, verdict.clone()).await {
        Ok(artifact) => {
            let body = AssessmentResponse {
                status: "success",
                eligibility: verdict.eligibility_label(),
                probability: verdict.rounded_probability(),
                reasons: verdict.reasons,
                components: verdict.components,
                report_url: artifact.url(),
                session_id,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => assembly_failure(err, &verdict),
    }
}

async fn assemble_off_thread<S, A>(
    service: Arc<EligibilityService<S, A>>,
    profile: ApplicantProfile,
    verdict: Verdict,
) -> Result<ReportArtifact, EligibilityServiceError>
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    tokio::task::spawn_blocking(move || service.assemble_report(&profile, &verdict))
        .await
        .map_err(|err| {
            EligibilityServiceError::Assembly(super::report::AssemblyError::Interrupted(
                err.to_string(),
            ))
        })?
}

/// The verdict is already computed; return it alongside the failure.
fn assembly_failure(err: EligibilityServiceError, verdict: &Verdict) -> Response {
    tracing::error!(error = %err, "report assembly failed");
    let payload = json!({
        "error": err.to_string(),
        "eligibility": verdict.eligibility_label(),
        "probability": verdict.rounded_probability(),
        "reasons": verdict.reasons,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

fn internal_error(err: EligibilityServiceError) -> Response {
    tracing::error!(error = %err, "eligibility request failed");
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
