//! Session state for incremental re-optimization.
//!
//! A session keeps the requirement set, the cumulative constraints, and the
//! last plan for one student/term. It is created by a build, mutated by each
//! optimize, and persisted through a [`SessionStore`]. At most one solve per
//! session id runs at a time ([`SessionLocks`]).

mod lock;
mod store;

pub use lock::{SessionGuard, SessionLocks};
pub use store::{InMemorySessionStore, SessionStore, StoreError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ConstraintDelta, Constraints, RequirementSet, SchedulePlan};

/// Keyed session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session_id: String,
    pub school: String,
    pub major: String,
    pub term: String,
    pub requirements: RequirementSet,
    /// Cumulative constraints after every merged delta.
    pub constraints: Constraints,
    pub last_plan: SchedulePlan,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Number of plans recorded.
    pub revision: u64,
}

impl SessionState {
    /// Creates a session with an empty plan.
    pub fn new(
        session_id: impl Into<String>,
        school: impl Into<String>,
        major: impl Into<String>,
        term: impl Into<String>,
        requirements: RequirementSet,
        constraints: Constraints,
    ) -> Self {
        let term = term.into();
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            school: school.into(),
            major: major.into(),
            last_plan: SchedulePlan::new(term.clone()),
            term,
            requirements,
            constraints,
            created_at: now,
            last_accessed: now,
            revision: 0,
        }
    }

    /// Folds a constraint delta into the cumulative constraints.
    pub fn apply(&mut self, delta: &ConstraintDelta) {
        self.constraints.merge(delta);
    }

    /// Stores a freshly computed plan.
    pub fn record(&mut self, plan: SchedulePlan) {
        self.last_plan = plan;
        self.revision += 1;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    /// Whether the session has been idle longer than `timeout` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_accessed > timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;

    fn state() -> SessionState {
        SessionState::new(
            "s1",
            "Pitt",
            "Computer Science",
            "2251",
            RequirementSet::new().with_required("CS0445"),
            Constraints::new().exclude_day(Weekday::Fri),
        )
    }

    #[test]
    fn test_new_session() {
        let s = state();
        assert_eq!(s.revision, 0);
        assert_eq!(s.last_plan.term, "2251");
        assert!(s.last_plan.sections.is_empty());
    }

    #[test]
    fn test_apply_accumulates() {
        let mut s = state();
        s.apply(&ConstraintDelta::new().exclude_day(Weekday::Mon));
        assert!(s.constraints.excluded_days.contains(&Weekday::Fri));
        assert!(s.constraints.excluded_days.contains(&Weekday::Mon));
    }

    #[test]
    fn test_record_bumps_revision() {
        let mut s = state();
        let before = s.last_accessed;
        let mut plan = SchedulePlan::new("2251");
        plan.explanations.push("x".into());
        s.record(plan.clone());
        assert_eq!(s.revision, 1);
        assert_eq!(s.last_plan, plan);
        assert!(s.last_accessed >= before);
    }

    #[test]
    fn test_expiry() {
        let mut s = state();
        s.last_accessed = Utc::now() - Duration::hours(25);
        assert!(s.is_expired(Utc::now(), Duration::hours(24)));
        s.touch();
        assert!(!s.is_expired(Utc::now(), Duration::hours(24)));
    }

    #[test]
    fn test_serde_round_trip_fields() {
        let json = serde_json::to_value(state()).unwrap();
        for key in ["sessionId", "requirements", "constraints", "lastPlan", "createdAt"] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
    }
}
