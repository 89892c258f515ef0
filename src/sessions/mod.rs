use crate::clock::{Clock, SystemClock};
use crate::constants::SESSIONS_KEY;
use crate::error::AppError;
use crate::models::{SessionMode, StudySession};
use crate::storage::{preserve_corrupt, Storage};
use crate::validation::{validate_notes, validate_session_name};
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Read-modify-write store for the `sessions` collection.
///
/// Nothing is cached: every call reads the stored collection, so two stores
/// sharing a backend always agree, and every mutation writes the whole
/// collection back in a single `Storage::set`.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Insert or replace a session and return the stored record.
    ///
    /// A session whose id matches a stored entry replaces it in place,
    /// keeping the original `created_at`. Anything else is appended under a
    /// fresh id with both timestamps set to now.
    pub fn save(&self, session: &StudySession) -> Result<StudySession, AppError> {
        let mut record = session.clone();
        record.name = validate_session_name(&session.name)?;
        if let Some(description) = &record.description {
            validate_notes("description", description)?;
        }
        if let Some(reflection) = &record.reflection {
            validate_notes("reflection", reflection)?;
        }

        let mut sessions = self.load()?;
        let now = self.clock.now_millis();

        let existing = sessions
            .iter_mut()
            .find(|s| record.is_persisted() && s.id == record.id);

        if let Some(existing) = existing {
            record.created_at = existing.created_at;
            // updated_at never moves backwards, even if the wall clock does
            record.updated_at = now.max(existing.updated_at);
            existing.clone_from(&record);
        } else {
            record.id = Uuid::new_v4().to_string();
            record.created_at = now;
            record.updated_at = now;
            info!("Created {} session {}", record.mode.as_str(), record.id);
            sessions.push(record.clone());
        }

        self.persist(&sessions)?;
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<Option<StudySession>, AppError> {
        Ok(self.load()?.into_iter().find(|s| s.id == id))
    }

    /// Remove a session. Returns false, without writing, if it was not stored.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut sessions = self.load()?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);

        if sessions.len() == before {
            return Ok(false);
        }

        self.persist(&sessions)?;
        info!("Deleted session {id}");
        Ok(true)
    }

    /// All sessions in stored order.
    pub fn list_all(&self) -> Result<Vec<StudySession>, AppError> {
        self.load()
    }

    pub fn list_by_mode(&self, mode: SessionMode) -> Result<Vec<StudySession>, AppError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|s| s.mode == mode)
            .collect())
    }

    /// Most recently updated sessions first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<StudySession>, AppError> {
        self.list_recent_filtered(None, limit)
    }

    pub fn list_recent_filtered(
        &self,
        mode: Option<SessionMode>,
        limit: usize,
    ) -> Result<Vec<StudySession>, AppError> {
        let mut sessions: Vec<StudySession> = self
            .load()?
            .into_iter()
            .filter(|s| mode.is_none_or(|m| s.mode == m))
            .collect();

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    fn load(&self) -> Result<Vec<StudySession>, AppError> {
        match self.storage.get(SESSIONS_KEY)? {
            Some(raw) => Ok(parse_sessions(self.storage.as_ref(), &raw)),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, sessions: &[StudySession]) -> Result<(), AppError> {
        let json = serde_json::to_string(sessions)?;
        self.storage.set(SESSIONS_KEY, &json).map_err(|e| {
            error!("Failed to persist {} sessions: {e}", sessions.len());
            e
        })
    }
}

/// Decode the stored collection, dropping whatever cannot be trusted.
///
/// A document that is not an array yields no sessions. Records that fail to
/// decode, lack an id, or repeat an earlier id are skipped. Either way the
/// raw text is preserved before it can be overwritten.
fn parse_sessions(storage: &dyn Storage, raw: &str) -> Vec<StudySession> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Stored sessions are corrupt, treating as empty: {e}");
            preserve_corrupt(storage, SESSIONS_KEY, raw);
            return Vec::new();
        }
    };

    let total = records.len();
    let mut seen = HashSet::new();
    let mut sessions = Vec::with_capacity(total);

    for record in records {
        match serde_json::from_value::<StudySession>(record) {
            Ok(session) if session.id.is_empty() => {
                warn!("Skipping stored session without an id");
            }
            Ok(session) => {
                if seen.insert(session.id.clone()) {
                    sessions.push(session);
                } else {
                    warn!("Skipping duplicate stored session {}", session.id);
                }
            }
            Err(e) => warn!("Skipping malformed stored session: {e}"),
        }
    }

    if sessions.len() < total {
        warn!("Dropped {} of {total} stored sessions", total - sessions.len());
        preserve_corrupt(storage, SESSIONS_KEY, raw);
    }
    sessions
}
