//! Loan eligibility intake, scoring, and reporting.
//!
//! Applicant data arrives as a complete profile, as a loose attribute mapping
//! (document extraction), or one answer at a time through the guided
//! dialogue. Every path converges on the same profile normalization and the
//! same scoring engine.

pub mod coercion;
pub mod dialogue;
pub mod domain;
pub mod fields;
pub mod import;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use coercion::{coerce_answer, CoercionError, CoercionPolicy};
pub use dialogue::store::{
    DialogueSession, InMemorySessionStore, SessionStore, SessionStoreError, SessionWrite,
};
pub use dialogue::{CompletedDialogue, DialogueReply, GuidedDialogue};
pub use domain::{AnswerMap, AnswerValue, ApplicantProfile, SessionId};
pub use fields::{FieldKind, ProfileField};
pub use import::{ImportError, ImportedProfile, ProfileCsvImporter};
pub use report::{
    AssemblyError, FactorContributions, MarkdownReportAssembler, ReportArtifact, ReportAssembler,
    ReportRequest,
};
pub use router::eligibility_router;
pub use scoring::{
    reason_codes, reasons, score, EligibilityEngine, IneligibilityReason, ScoreComponent,
    ScoringFactor, Verdict, ELIGIBILITY_THRESHOLD,
};
pub use service::{EligibilityService, EligibilityServiceError, SubmissionOutcome};
