//! Single-writer discipline per session id.
//!
//! A solve holds a [`SessionGuard`] for its session id from load to save. A
//! second request for the same id is rejected while the guard lives;
//! different ids never contend.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of session ids with a solve in flight.
#[derive(Debug, Default)]
pub struct SessionLocks {
    active: Mutex<HashSet<String>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `session_id`, or `None` if a solve already holds it.
    pub fn try_acquire(&self, session_id: &str) -> Option<SessionGuard<'_>> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(session_id.to_string()) {
            return None;
        }
        Some(SessionGuard {
            locks: self,
            session_id: session_id.to_string(),
        })
    }

    pub fn is_locked(&self, session_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(session_id)
    }
}

/// Releases its session id on drop.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session_id: String,
}

impl SessionGuard<'_> {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.locks
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_single_writer() {
        let locks = SessionLocks::new();
        let guard = locks.try_acquire("s1").unwrap();
        assert_eq!(guard.session_id(), "s1");
        assert!(locks.try_acquire("s1").is_none());
        assert!(locks.try_acquire("s2").is_some());

        drop(guard);
        assert!(!locks.is_locked("s1"));
        assert!(locks.try_acquire("s1").is_some());
    }

    #[test]
    fn test_across_threads() {
        let locks = Arc::new(SessionLocks::new());
        let guard = locks.try_acquire("shared").unwrap();

        let other = Arc::clone(&locks);
        let busy = thread::spawn(move || {
            let claimed = other.try_acquire("shared");
            claimed.is_none()
        })
        .join()
        .unwrap();
        assert!(busy);

        drop(guard);
        let other = Arc::clone(&locks);
        let free = thread::spawn(move || {
            let claimed = other.try_acquire("shared");
            claimed.is_some()
        })
        .join()
        .unwrap();
        assert!(free);
    }
}
