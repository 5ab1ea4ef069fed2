//! Session store trait and in-memory implementation.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use super::SessionState;
use crate::config::SolverConfig;

/// Session store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("internal store error: {0}")]
    Internal(String),
}

/// Persistence for [`SessionState`] records, keyed by session id.
///
/// `load` returns `Ok(None)` for unknown and expired sessions alike.
pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: &str) -> Result<Option<SessionState>, StoreError>;

    fn save(&self, state: &SessionState) -> Result<(), StoreError>;

    /// Removes a session. Returns whether it existed.
    fn delete(&self, session_id: &str) -> Result<bool, StoreError>;
}

/// In-memory implementation for development and testing.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
    timeout: Duration,
}

impl InMemorySessionStore {
    /// Create a store with the default 24-hour idle timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::hours(24))
    }

    /// Create a store with a custom idle timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Create a store using `session_timeout_hours` from `config`.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_timeout(Duration::hours(config.session_timeout_hours))
    }

    /// Drops every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.timeout));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "purged expired sessions");
        }
        Ok(removed)
    }

    /// Number of stored sessions, expired ones included.
    pub fn len(&self) -> Result<usize, StoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, session_id: &str) -> Result<Option<SessionState>, StoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sessions
            .get(session_id)
            .filter(|s| !s.is_expired(Utc::now(), self.timeout))
            .cloned())
    }

    fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        sessions.insert(state.session_id.clone(), state.clone());
        Ok(())
    }

    fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sessions.remove(session_id).is_some())
    }
}
