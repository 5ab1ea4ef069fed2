use thiserror::Error;

use crate::providers::ProviderError;
use crate::session::StoreError;
use crate::validation::ValidationError;

/// Failures surfaced to callers of [`crate::service::ScheduleService`].
///
/// Ordinary infeasibility is never an error; it is reported through
/// [`crate::models::Issue`]s on a partial plan.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session busy: {0}")]
    SessionBusy(String),

    #[error("no requirements for {major} at {school}")]
    RequirementsNotFound { school: String, major: String },

    #[error("invalid term code: {0:?}")]
    InvalidTerm(String),

    #[error("invalid requirements: {} error(s)", .0.len())]
    InvalidRequirements(Vec<ValidationError>),

    #[error("requirements provider: {0}")]
    Requirements(ProviderError),

    #[error("catalog provider: {0}")]
    Catalog(ProviderError),

    #[error("preference parser: {0}")]
    Preferences(ProviderError),

    #[error("session store: {0}")]
    Store(#[from] StoreError),
}

impl ScheduleError {
    /// Whether the caller must rebuild rather than retry.
    pub fn requires_rebuild(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ScheduleError::SessionNotFound("abc".into()).to_string(),
            "session not found: abc"
        );
        assert_eq!(
            ScheduleError::RequirementsNotFound {
                school: "Pitt".into(),
                major: "Computer Science".into(),
            }
            .to_string(),
            "no requirements for Computer Science at Pitt"
        );
        assert_eq!(
            ScheduleError::InvalidRequirements(vec![]).to_string(),
            "invalid requirements: 0 error(s)"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let err: ScheduleError = StoreError::Internal("poisoned".into()).into();
        assert!(matches!(err, ScheduleError::Store(_)));
        assert!(!err.requires_rebuild());
        assert!(ScheduleError::SessionNotFound("x".into()).requires_rebuild());
    }
}
