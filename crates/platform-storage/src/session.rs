//! High-level API for session bookkeeping and the handshake audit trail.

use crate::{KeyValueStore, StorageError, StorageKeys, StorageResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Persisted session bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Option<String>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Typed access to the auth layer's keys on top of any backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    // ==========================================
    // Session
    // ==========================================

    /// Record a freshly established session and stamp activity now.
    pub fn start_session(&self, session_id: &str, user_id: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::SESSION_ID, session_id)?;
        self.storage.set(StorageKeys::SESSION_USER_ID, user_id)?;
        self.touch_activity_at(Utc::now())
    }

    /// Stamp user activity.
    pub fn touch_activity_at(&self, at: DateTime<Utc>) -> StorageResult<()> {
        self.storage
            .set(StorageKeys::LAST_ACTIVITY_AT, &at.to_rfc3339())
    }

    /// Forget the activity stamp, keeping the session.
    pub fn clear_activity(&self) -> StorageResult<()> {
        self.storage.remove(StorageKeys::LAST_ACTIVITY_AT)?;
        Ok(())
    }

    pub fn session_id(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::SESSION_ID)
    }

    /// Last recorded activity. A value that fails to parse is an encoding error.
    pub fn last_activity_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        match self.storage.get(StorageKeys::LAST_ACTIVITY_AT)? {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| StorageError::Encoding(format!("Invalid last activity timestamp: {}", e))),
            None => Ok(None),
        }
    }

    /// Full session record, or `None` when logged out.
    pub fn session(&self) -> StorageResult<Option<SessionRecord>> {
        let Some(session_id) = self.session_id()? else {
            return Ok(None);
        };
        Ok(Some(SessionRecord {
            session_id,
            user_id: self.storage.get(StorageKeys::SESSION_USER_ID)?,
            last_activity_at: self.last_activity_at()?,
        }))
    }

    /// Remove all session keys.
    pub fn clear_session(&self) -> StorageResult<()> {
        self.storage.remove(StorageKeys::SESSION_ID)?;
        self.storage.remove(StorageKeys::SESSION_USER_ID)?;
        self.storage.remove(StorageKeys::LAST_ACTIVITY_AT)?;
        Ok(())
    }

    // ==========================================
    // Audit trail
    // ==========================================

    pub fn record_id_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::AUDIT_ID_TOKEN, token)
    }

    pub fn record_profile(&self, profile: &serde_json::Value) -> StorageResult<()> {
        self.storage
            .set(StorageKeys::AUDIT_PROFILE, &serde_json::to_string(profile)?)
    }

    pub fn record_step(&self, step: &str, at: DateTime<Utc>) -> StorageResult<()> {
        let key = format!("{}{}", StorageKeys::AUDIT_STEP_PREFIX, step);
        self.storage.set(&key, &at.to_rfc3339())
    }

    pub fn step_timestamp(&self, step: &str) -> StorageResult<Option<String>> {
        let key = format!("{}{}", StorageKeys::AUDIT_STEP_PREFIX, step);
        self.storage.get(&key)
    }

    pub fn record_error(&self, message: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::AUDIT_LAST_ERROR, message)
    }
}
