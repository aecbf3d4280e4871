use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::coercion::CoercionPolicy;
use super::dialogue::store::{SessionStore, SessionStoreError};
use super::dialogue::{DialogueReply, GuidedDialogue};
use super::domain::{ApplicantProfile, SessionId};
use super::report::{AssemblyError, ReportArtifact, ReportAssembler, ReportRequest};
use super::scoring::{EligibilityEngine, Verdict};

/// Result of a one-shot submission, with the dialogue session it seeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub session_id: SessionId,
    pub profile: ApplicantProfile,
    pub verdict: Verdict,
}

/// Service composing the scoring engine, the guided dialogue, and report assembly.
pub struct EligibilityService<S, A> {
    engine: EligibilityEngine,
    dialogue: GuidedDialogue<S>,
    assembler: Arc<A>,
}

impl<S, A> EligibilityService<S, A>
where
    S: SessionStore + 'static,
    A: ReportAssembler + 'static,
{
    pub fn new(store: Arc<S>, assembler: Arc<A>, policy: CoercionPolicy) -> Self {
        Self {
            engine: EligibilityEngine::new(),
            dialogue: GuidedDialogue::new(store, policy),
            assembler,
        }
    }

    pub fn dialogue(&self) -> &GuidedDialogue<S> {
        &self.dialogue
    }

    pub fn assess(&self, profile: &ApplicantProfile) -> Verdict {
        self.engine.assess(profile)
    }

    /// Score a complete profile and seed a finished dialogue session for it.
    pub fn submit_profile(
        &self,
        profile: ApplicantProfile,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, EligibilityServiceError> {
        let profile = profile.normalized();
        let verdict = self.engine.assess(&profile);
        let session_id = SessionId::generate();
        self.dialogue.seed(session_id.clone(), &profile, now)?;

        tracing::info!(
            %session_id,
            probability = verdict.probability,
            eligible = verdict.eligible,
            "profile submission assessed"
        );

        Ok(SubmissionOutcome {
            session_id,
            profile,
            verdict,
        })
    }

    /// Same as [`submit_profile`](Self::submit_profile) for an untyped attribute
    /// mapping such as document extraction output.
    pub fn submit_attributes(
        &self,
        attributes: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, EligibilityServiceError> {
        self.submit_profile(ApplicantProfile::from_raw_attributes(attributes), now)
    }

    pub fn step(
        &self,
        session_id: &SessionId,
        answer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DialogueReply, EligibilityServiceError> {
        Ok(self.dialogue.step(session_id, answer, now)?)
    }

    /// Hand a finished verdict to the report assembler. Call this outside any
    /// session update; assembly may block on I/O.
    pub fn assemble_report(
        &self,
        profile: &ApplicantProfile,
        verdict: &Verdict,
    ) -> Result<ReportArtifact, EligibilityServiceError> {
        let output_id = format!("loan_report_{}", uuid::Uuid::new_v4().simple());
        let artifact = self.assembler.assemble(&ReportRequest {
            profile,
            verdict,
            output_id: &output_id,
        })?;
        Ok(artifact)
    }

    pub fn expire_sessions(&self, now: DateTime<Utc>) -> Result<usize, EligibilityServiceError> {
        Ok(self.dialogue.expire(now)?)
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error(transparent)]
    Sessions(#[from] SessionStoreError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
