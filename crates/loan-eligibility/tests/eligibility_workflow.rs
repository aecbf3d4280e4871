//! End-to-end flows through the public service facade and HTTP router, with
//! reports written to a scratch directory.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{TimeZone, Utc};
use loan_eligibility::workflows::eligibility::{
    eligibility_router, ApplicantProfile, CoercionPolicy, DialogueReply, EligibilityService,
    InMemorySessionStore, MarkdownReportAssembler, ProfileCsvImporter, ProfileField, SessionId,
};
use serde_json::{json, Value};
use tower::ServiceExt;

type Service = EligibilityService<InMemorySessionStore, MarkdownReportAssembler>;

fn service_in(dir: &std::path::Path) -> Service {
    EligibilityService::new(
        Arc::new(InMemorySessionStore::default()),
        Arc::new(MarkdownReportAssembler::new(dir)),
        CoercionPolicy::DefaultOnError,
    )
}

async fn post(router: &axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn guided_dialogue_over_http_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = eligibility_router(Arc::new(service_in(dir.path())));

    let answers = [
        "Kiran", "41", "Male", "Single", "0", "Postgraduate", "Engineer", "Salaried", "12",
        "1500000", "900000", "250000", "no", "closed", "300000", "5000", "Car", "700000", "48",
        "Rental income", "3", "15", "no", "no",
    ];

    let (status, body) = post(&router, "/api/v1/dialogue", json!({ "session_id": "kiran" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["field"], "username");

    let mut last = body;
    for answer in answers {
        let (status, body) = post(
            &router,
            "/api/v1/dialogue",
            json!({ "session_id": "kiran", "answer": answer }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }

    assert_eq!(last["status"], "completed");
    assert_eq!(last["eligibility"], "eligible");
    assert_eq!(last["profile"]["annual_salary"], 1_500_000.0);
    assert_eq!(last["profile"]["num_credit_cards"], 3);
    assert_eq!(last["reasons"], json!([]));

    let url = last["report_url"].as_str().expect("report url");
    let file_name = url.strip_prefix("/reports/").expect("reports prefix");
    let report = std::fs::read_to_string(dir.path().join(file_name)).expect("report on disk");
    assert!(report.contains("Loan Eligibility Report: Kiran"));
    assert!(report.contains("Result: Eligible"));
}

#[tokio::test]
async fn finished_session_cannot_be_resumed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = eligibility_router(Arc::new(service_in(dir.path())));

    let profile = serde_json::to_value(ApplicantProfile {
        username: "Ravi".to_string(),
        late_payment_history: true,
        ..ApplicantProfile::default()
    })
    .expect("serializes");
    let (status, body) = post(&router, "/api/v1/eligibility/manual", profile).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligibility"], "not eligible");
    let session_id = body["session_id"].clone();

    let (_, completed) = post(&router, "/api/v1/dialogue", json!({ "session_id": session_id })).await;
    assert_eq!(completed["status"], "completed");

    let (_, restarted) = post(&router, "/api/v1/dialogue", json!({ "session_id": session_id })).await;
    assert_eq!(restarted["status"], "in_progress");
    assert_eq!(restarted["field"], "username");
}

#[test]
fn imported_rows_can_be_assessed_and_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = service_in(dir.path());
    let csv = "username,annual_salary,total_emi_amount_per_month,loan_amount,late_payment_history\n\
               Meera,600000,2000,200000,no\n\
               Arjun,0,,500000,yes\n";

    let rows = ProfileCsvImporter::from_reader(Cursor::new(csv)).expect("csv parses");
    assert_eq!(rows.len(), 2);

    let verdicts: Vec<_> = rows
        .iter()
        .map(|row| service.assess(&row.profile))
        .collect();
    assert!(verdicts[0].eligible);
    assert!(!verdicts[1].eligible);

    let artifact = service
        .assemble_report(&rows[1].profile, &verdicts[1])
        .expect("report assembled");
    let report = std::fs::read_to_string(&artifact.path).expect("report readable");
    assert!(report.contains("History of late payments detected."));
}

#[test]
fn manual_submission_hands_off_to_dialogue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = service_in(dir.path());
    let now = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");

    let outcome = service
        .submit_profile(
            ApplicantProfile {
                username: "Asha".to_string(),
                annual_salary: 420_000.0,
                ..ApplicantProfile::default()
            },
            now,
        )
        .expect("submits");

    let SessionId(raw) = &outcome.session_id;
    assert!(!raw.is_empty());

    match service.step(&outcome.session_id, None, now).expect("steps") {
        DialogueReply::Completed(completed) => {
            assert_eq!(completed.profile.username, "Asha");
            assert_eq!(completed.verdict.probability, outcome.verdict.probability);
        }
        DialogueReply::InProgress { field, .. } => {
            panic!("seeded session asked about {}", ProfileField::name(field))
        }
    }
}
