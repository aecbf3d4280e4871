use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{AnswerMap, ApplicantProfile, SessionId};
use super::super::fields::ProfileField;

/// Progress through the guided dialogue for one caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueSession {
    /// Index of the next field to ask about; equals the sequence length once complete.
    pub cursor: usize,
    pub answers: AnswerMap,
    pub created_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
}

impl DialogueSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            cursor: 0,
            answers: AnswerMap::new(),
            created_at: now,
            touched_at: now,
        }
    }

    /// A session that already holds every answer and completes on its next step.
    pub fn seeded(profile: &ApplicantProfile, now: DateTime<Utc>) -> Self {
        Self {
            cursor: ProfileField::SEQUENCE.len(),
            answers: profile.to_answers(),
            created_at: now,
            touched_at: now,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= ProfileField::SEQUENCE.len()
    }

    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.touched_at) > ttl
    }
}

/// Outcome of an atomic session update.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionWrite {
    Keep(DialogueSession),
    Remove,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for dialogue sessions so the dialogue can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn get(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<DialogueSession>, SessionStoreError>;

    fn put(&self, id: SessionId, session: DialogueSession) -> Result<(), SessionStoreError>;

    fn delete(&self, id: &SessionId) -> Result<Option<DialogueSession>, SessionStoreError>;

    /// Evict sessions idle beyond the TTL, returning how many were dropped.
    fn expire(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError>;

    /// Read-modify-write a single session without interleaving other writers
    /// for the same id. Stale sessions are handed to `apply` as `None`.
    fn update<T, F>(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
        apply: F,
    ) -> Result<T, SessionStoreError>
    where
        F: FnOnce(Option<DialogueSession>) -> (SessionWrite, T);
}

/// Process-local store with idle expiry.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, DialogueSession>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionStoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, DialogueSession>>, SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session mutex poisoned".to_string()))
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(30))
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<DialogueSession>, SessionStoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(id)
            .filter(|session| !session.is_stale(now, self.ttl))
            .cloned())
    }

    fn put(&self, id: SessionId, session: DialogueSession) -> Result<(), SessionStoreError> {
        self.lock()?.insert(id, session);
        Ok(())
    }

    fn delete(&self, id: &SessionId) -> Result<Option<DialogueSession>, SessionStoreError> {
        Ok(self.lock()?.remove(id))
    }

    fn expire(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|_, session| !session.is_stale(now, self.ttl));
        Ok(before - guard.len())
    }

    fn update<T, F>(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
        apply: F,
    ) -> Result<T, SessionStoreError>
    where
        F: FnOnce(Option<DialogueSession>) -> (SessionWrite, T),
    {
        let mut guard = self.lock()?;
        let current = guard
            .remove(id)
            .filter(|session| !session.is_stale(now, self.ttl));

        let (write, output) = apply(current);
        if let SessionWrite::Keep(session) = write {
            guard.insert(id.clone(), session);
        }
        Ok(output)
    }
}
