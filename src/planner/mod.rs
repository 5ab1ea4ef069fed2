//! Course selection: which courses (not yet sections) fill a term.
//!
//! The planner walks the requirement categories in a fixed order (pins,
//! required list, general-education groups, elective groups) and picks group
//! members with a composable [`SelectionPolicy`] of [`SelectionRule`]s.
//!
//! # Usage
//!
//! ```
//! use u_course_schedule::planner::{rules, SelectionPolicy};
//!
//! let policy = SelectionPolicy::new()
//!     .with_rule(rules::PrerequisitesSatisfied)
//!     .with_rule(rules::CreditFit);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod policy;
pub mod rules;
mod selection;

pub use context::{CandidateCourse, SelectionContext};
pub use policy::{SelectionCriterion, SelectionPolicy};
pub use selection::{Category, CourseSelection, CourseSelectionPlanner, SelectedCourse};

use std::fmt::Debug;

/// Score returned by a selection rule.
///
/// Lower scores = higher priority (selected first).
pub type RuleScore = f64;

/// A rule that ranks candidate courses within a choose-from group.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait SelectionRule: Send + Sync + Debug {
    /// Rule name (e.g., "CREDIT_FIT").
    fn name(&self) -> &'static str;

    /// Evaluates a candidate given the current selection state.
    fn evaluate(&self, candidate: &CandidateCourse, context: &SelectionContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
