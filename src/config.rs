//! Solver configuration.
//!
//! Defaults cover every field, so an empty TOML document is a valid config.
//! Environment variables override individual knobs at deploy time.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::planner::SelectionCriterion;

/// Errors from loading or validating a [`SolverConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning knobs for planning, search, and sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Alternatives listed per placed course.
    pub alternatives_per_course: usize,
    /// Attempt cap multiplier: courses × average candidate sections × factor.
    pub search_budget_factor: usize,
    /// Attempt cap floor.
    pub min_search_budget: usize,
    /// Credit floor when neither constraints nor requirements set one.
    pub default_min_credits: u32,
    /// Credit ceiling when neither constraints nor requirements set one.
    pub default_max_credits: u32,
    /// Cap on the number of courses selected for a term.
    pub max_courses: Option<usize>,
    /// Sessions idle longer than this are treated as expired.
    pub session_timeout_hours: i64,
    /// Group candidate ordering, most significant first.
    pub selection_order: Vec<SelectionCriterion>,
}

impl SolverConfig {
    /// Timeout variable name.
    pub const ENV_SESSION_TIMEOUT: &'static str = "SESSION_TIMEOUT_HOURS";
    /// Search budget factor variable name.
    pub const ENV_SEARCH_BUDGET_FACTOR: &'static str = "SCHEDULE_SEARCH_BUDGET_FACTOR";
    /// Alternatives-per-course variable name.
    pub const ENV_ALTERNATIVES: &'static str = "SCHEDULE_ALTERNATIVES";

    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    ///
    /// Priority: `SESSION_TIMEOUT_HOURS`, `SCHEDULE_SEARCH_BUDGET_FACTOR`,
    /// `SCHEDULE_ALTERNATIVES`, then the compiled-in defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| env::var(var).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(Self::ENV_SESSION_TIMEOUT) {
            self.session_timeout_hours = parse_var(Self::ENV_SESSION_TIMEOUT, v)?;
        }
        if let Some(v) = lookup(Self::ENV_SEARCH_BUDGET_FACTOR) {
            self.search_budget_factor = parse_var(Self::ENV_SEARCH_BUDGET_FACTOR, v)?;
        }
        if let Some(v) = lookup(Self::ENV_ALTERNATIVES) {
            self.alternatives_per_course = parse_var(Self::ENV_ALTERNATIVES, v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_min_credits > self.default_max_credits {
            return Err(ConfigError::Invalid(format!(
                "default_min_credits {} exceeds default_max_credits {}",
                self.default_min_credits, self.default_max_credits
            )));
        }
        if self.session_timeout_hours <= 0 {
            return Err(ConfigError::Invalid(
                "session_timeout_hours must be positive".into(),
            ));
        }
        if self.search_budget_factor == 0 {
            return Err(ConfigError::Invalid(
                "search_budget_factor must be positive".into(),
            ));
        }
        for (i, c) in self.selection_order.iter().enumerate() {
            if self.selection_order[..i].contains(c) {
                return Err(ConfigError::Invalid(format!(
                    "selection_order lists {c:?} twice"
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            alternatives_per_course: 3,
            search_budget_factor: 8,
            min_search_budget: 512,
            default_min_credits: 12,
            default_max_credits: 18,
            max_courses: None,
            session_timeout_hours: 24,
            selection_order: vec![
                SelectionCriterion::PrerequisitesSatisfied,
                SelectionCriterion::CreditFit,
                SelectionCriterion::CourseCode,
            ],
        }
    }
}
