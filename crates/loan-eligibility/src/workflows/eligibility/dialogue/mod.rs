//! Guided intake dialogue.
//!
//! Each step either records the answer to the previously asked question and
//! asks the next one, or, once every field has been asked, scores the
//! collected profile and discards the session. Sessions seeded from a manual
//! submission skip straight to completion.

pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::coercion::CoercionPolicy;
use super::domain::{ApplicantProfile, SessionId};
use super::fields::ProfileField;
use super::scoring::{EligibilityEngine, Verdict};
use store::{DialogueSession, SessionStore, SessionStoreError, SessionWrite};

/// Reply to a single dialogue step.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueReply {
    InProgress {
        field: ProfileField,
        question: &'static str,
        /// Set when the previous answer was rejected and the question is repeated.
        notice: Option<String>,
    },
    Completed(Box<CompletedDialogue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedDialogue {
    pub profile: ApplicantProfile,
    pub verdict: Verdict,
}

pub struct GuidedDialogue<S> {
    store: Arc<S>,
    engine: EligibilityEngine,
    policy: CoercionPolicy,
}

impl<S> GuidedDialogue<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: Arc<S>, policy: CoercionPolicy) -> Self {
        Self {
            store,
            engine: EligibilityEngine::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Advance the session identified by `session_id`, creating it when unknown.
    pub fn step(
        &self,
        session_id: &SessionId,
        answer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DialogueReply, SessionStoreError> {
        let policy = self.policy;
        let engine = self.engine;

        self.store.update(session_id, now, |existing| {
            let mut session = match existing {
                Some(session) => session,
                None => {
                    if answer.is_some() {
                        warn!(%session_id, "answer received for unknown session; starting over");
                    } else {
                        info!(%session_id, "dialogue session created");
                    }
                    DialogueSession::new(now)
                }
            };
            session.touched_at = now;

            if let (Some(raw), Some(answered)) = (answer, previous_field(&session)) {
                match policy.apply(answered, raw) {
                    Ok(value) => {
                        debug!(%session_id, field = answered.name(), "answer recorded");
                        session.answers.insert(answered, value);
                    }
                    Err(err) => {
                        debug!(%session_id, field = answered.name(), error = %err, "answer rejected");
                        let reply = DialogueReply::InProgress {
                            field: answered,
                            question: answered.question(),
                            notice: Some(err.to_string()),
                        };
                        return (SessionWrite::Keep(session), reply);
                    }
                }
            }

            if session.is_complete() {
                let profile = ApplicantProfile::from_answers(&session.answers);
                let verdict = engine.assess(&profile);
                info!(
                    %session_id,
                    probability = verdict.probability,
                    eligible = verdict.eligible,
                    "dialogue session completed"
                );
                let reply = DialogueReply::Completed(Box::new(CompletedDialogue { profile, verdict }));
                return (SessionWrite::Remove, reply);
            }

            let field = ProfileField::SEQUENCE[session.cursor];
            session.cursor += 1;
            let reply = DialogueReply::InProgress {
                field,
                question: field.question(),
                notice: None,
            };
            (SessionWrite::Keep(session), reply)
        })
    }

    /// Register a session that already holds every answer, so the next step
    /// for `session_id` completes without asking anything.
    pub fn seed(
        &self,
        session_id: SessionId,
        profile: &ApplicantProfile,
        now: DateTime<Utc>,
    ) -> Result<(), SessionStoreError> {
        debug!(%session_id, "dialogue session seeded from submission");
        self.store
            .put(session_id, DialogueSession::seeded(profile, now))
    }

    pub fn expire(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
        let evicted = self.store.expire(now)?;
        if evicted > 0 {
            info!(evicted, "expired idle dialogue sessions");
        }
        Ok(evicted)
    }
}

/// The field the previous question asked about, if any question has been asked.
fn previous_field(session: &DialogueSession) -> Option<ProfileField> {
    session
        .cursor
        .checked_sub(1)
        .and_then(|index| ProfileField::SEQUENCE.get(index).copied())
}
