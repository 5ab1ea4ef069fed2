//! Schedule plan (solution) model.
//!
//! A plan is the product of one solve: the chosen sections, their credit
//! total, ordered explanation strings, alternative sections per course, and
//! the structured issues behind any unmet constraint. Partial plans are
//! normal output, not errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Section;

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Every selected course was assigned a section.
    Complete,
    /// Some selected courses could not be assigned.
    Partial,
    /// Nothing could be scheduled.
    #[default]
    InfeasibleEmpty,
}

/// Classification of unmet or adjusted constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The catalog has no sections for a course this term.
    DataUnavailable,
    /// Credit bounds cannot be met.
    Infeasible,
    /// Every candidate section conflicts with committed meetings.
    ConflictUnresolvable,
    /// A pinned section is gone from the catalog or collides with another pin.
    PinInvalidated,
    /// A soft preference was relaxed to place a course.
    ConstraintRelaxed,
    /// A requirement (required course, group count) is not met.
    RequirementUnmet,
    /// A course was excluded because its prerequisites are not satisfied.
    PrerequisiteUnmet,
    /// No section satisfies the hard day/time preferences.
    PreferenceViolated,
}

/// An unmet or adjusted constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    /// Related course, when the issue concerns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Creates an issue about a specific course.
    pub fn course(kind: IssueKind, course: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            course: Some(course.into()),
            message: message.into(),
        }
    }

    /// Creates an issue about the plan as a whole.
    pub fn general(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            course: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Sections considered for a course but not chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub course: String,
    pub sections: Vec<Section>,
}

/// The result of a build or optimize call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlan {
    /// Term code.
    pub term: String,
    /// Sum of chosen sections' credits.
    pub total_credits: u32,
    /// Chosen sections, one per course.
    pub sections: Vec<Section>,
    /// Ordered explanation strings.
    pub explanations: Vec<String>,
    /// Next-best sections per placed course.
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub status: SolveStatus,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SchedulePlan {
    /// Creates an empty plan for `term`.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Adds a section and its credits.
    pub fn add_section(&mut self, section: Section) {
        self.total_credits += section.credits;
        self.sections.push(section);
    }

    /// Chosen section for `course`.
    pub fn section_for(&self, course: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.course == course)
    }

    /// Course codes in plan order.
    pub fn course_codes(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.course.as_str()).collect()
    }

    /// Whether any two chosen sections overlap.
    pub fn has_conflicts(&self) -> bool {
        self.sections.iter().enumerate().any(|(i, a)| {
            self.sections[i + 1..]
                .iter()
                .any(|b| a.conflicts_with(b))
        })
    }

    /// Issues of a given kind.
    pub fn issues_of(&self, kind: IssueKind) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.kind == kind).collect()
    }

    /// Alternatives listed for `course`.
    pub fn alternatives_for(&self, course: &str) -> &[Section] {
        self.alternatives
            .iter()
            .find(|a| a.course == course)
            .map(|a| a.sections.as_slice())
            .unwrap_or(&[])
    }

    /// Whether every selected course was placed.
    pub fn is_complete(&self) -> bool {
        self.status == SolveStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday::*;

    fn sample_plan() -> SchedulePlan {
        let mut plan = SchedulePlan::new("2251");
        plan.add_section(
            Section::new("CS0445", "1")
                .with_credits(4)
                .with_meetings(&[Mon, Wed], 600, 675),
        );
        plan.add_section(Section::new("CS1501", "3").with_meetings(&[Tue, Thu], 540, 615));
        plan
    }

    #[test]
    fn test_totals_and_lookup() {
        let plan = sample_plan();
        assert_eq!(plan.total_credits, 7);
        assert_eq!(plan.section_for("CS1501").unwrap().crn, "3");
        assert!(plan.section_for("CS9999").is_none());
        assert_eq!(plan.course_codes(), vec!["CS0445", "CS1501"]);
    }

    #[test]
    fn test_has_conflicts() {
        let mut plan = sample_plan();
        assert!(!plan.has_conflicts());
        plan.add_section(Section::new("MATH0220", "9").with_meeting(Mon, 630, 700));
        assert!(plan.has_conflicts());
    }

    #[test]
    fn test_issues_of() {
        let mut plan = sample_plan();
        plan.issues.push(Issue::course(IssueKind::PinInvalidated, "CS1550", "gone"));
        plan.issues.push(Issue::general(IssueKind::Infeasible, "short"));
        assert_eq!(plan.issues_of(IssueKind::PinInvalidated).len(), 1);
        assert_eq!(plan.issues_of(IssueKind::DataUnavailable).len(), 0);
        assert!(plan.alternatives_for("CS0445").is_empty());
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(sample_plan()).unwrap();
        for key in ["term", "totalCredits", "sections", "explanations", "alternatives"] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
        assert_eq!(json["status"], "infeasible_empty");
    }
}
