use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::eligibility::dialogue::store::{
    DialogueSession, SessionStore, SessionStoreError, SessionWrite,
};
use crate::workflows::eligibility::domain::{ApplicantProfile, SessionId};
use crate::workflows::eligibility::report::{
    AssemblyError, ReportArtifact, ReportAssembler, ReportRequest,
};
use crate::workflows::eligibility::{
    eligibility_router, CoercionPolicy, EligibilityService, InMemorySessionStore,
};

pub(super) fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn session(value: &str) -> SessionId {
    SessionId(value.to_string())
}

/// Salaried applicant with savings, low EMI and a settled previous loan.
pub(super) fn strong_profile() -> ApplicantProfile {
    ApplicantProfile {
        username: "Meera".to_string(),
        age: 34,
        employment_type: "Salaried".to_string(),
        annual_salary: 600_000.0,
        total_emi_amount_per_month: 2_000.0,
        savings_balance: 100_000.0,
        avg_credit_utilization_pct: 20.0,
        years_of_employment: 5.0,
        previous_loan_status: "paid".to_string(),
        loan_amount: 200_000.0,
        ..ApplicantProfile::default()
    }
}

/// No declared income with late payments and an outstanding balance.
pub(super) fn risky_profile() -> ApplicantProfile {
    ApplicantProfile {
        username: "Arjun".to_string(),
        annual_salary: 0.0,
        loan_amount: 500_000.0,
        late_payment_history: true,
        previous_balance_flag: true,
        ..ApplicantProfile::default()
    }
}

/// One answer per dialogue question, in question order.
pub(super) fn interview_answers() -> [&'static str; 24] {
    [
        "Meera", "34", "Female", "Married", "2", "Graduate", "Analyst", "Salaried", "5",
        "600000", "0", "100000", "no", "paid", "0", "2000", "Home renovation", "200000", "36",
        "None", "2", "20", "no", "yes",
    ]
}

pub(super) fn build_service(
    policy: CoercionPolicy,
) -> (
    EligibilityService<InMemorySessionStore, RecordingAssembler>,
    Arc<InMemorySessionStore>,
    Arc<RecordingAssembler>,
) {
    let store = Arc::new(InMemorySessionStore::default());
    let assembler = Arc::new(RecordingAssembler::default());
    let service = EligibilityService::new(store.clone(), assembler.clone(), policy);
    (service, store, assembler)
}

pub(super) fn router_with_service(
    service: EligibilityService<InMemorySessionStore, RecordingAssembler>,
) -> axum::Router {
    eligibility_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct RecordingAssembler {
    requests: Arc<Mutex<Vec<(String, f64)>>>,
}

impl RecordingAssembler {
    pub(super) fn requests(&self) -> Vec<(String, f64)> {
        self.requests.lock().expect("assembler mutex poisoned").clone()
    }
}

impl ReportAssembler for RecordingAssembler {
    fn assemble(&self, request: &ReportRequest<'_>) -> Result<ReportArtifact, AssemblyError> {
        self.requests
            .lock()
            .expect("assembler mutex poisoned")
            .push((request.output_id.to_string(), request.verdict.probability));
        let file_name = format!("{}.md", request.output_id);
        Ok(ReportArtifact {
            path: std::path::PathBuf::from("/reports").join(&file_name),
            file_name,
        })
    }
}

pub(super) struct FailingAssembler;

impl ReportAssembler for FailingAssembler {
    fn assemble(&self, request: &ReportRequest<'_>) -> Result<ReportArtifact, AssemblyError> {
        Err(AssemblyError::Write {
            path: std::path::PathBuf::from(format!("/read-only/{}.md", request.output_id)),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only"),
        })
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn get(
        &self,
        _id: &SessionId,
        _now: DateTime<Utc>,
    ) -> Result<Option<DialogueSession>, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn put(&self, _id: SessionId, _session: DialogueSession) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn delete(&self, _id: &SessionId) -> Result<Option<DialogueSession>, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn expire(&self, _now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn update<T, F>(
        &self,
        _id: &SessionId,
        _now: DateTime<Utc>,
        _apply: F,
    ) -> Result<T, SessionStoreError>
    where
        F: FnOnce(Option<DialogueSession>) -> (SessionWrite, T),
    {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
