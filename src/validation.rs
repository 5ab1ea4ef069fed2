//! Requirement set validation.
//!
//! Checks structural integrity of a [`RequirementSet`] before planning.
//! Detects:
//! - Duplicate course codes (required list, group options)
//! - Malformed choose-from groups (zero count, count larger than options)
//! - Inverted credit bounds
//! - Self prerequisites
//! - Circular prerequisite dependencies
//!
//! A failing set is a data error from the requirements collaborator; the
//! planner never tries to repair it.
//!
//! # Reference
//! Kahn (1962), "Topological sorting of large networks"

use std::collections::BTreeSet;
use std::fmt;

use crate::models::RequirementSet;
use crate::prereq::PrerequisiteGraph;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A course code appears twice in the same list.
    DuplicateCourse,
    /// A group's count cannot be satisfied by its options.
    InvalidGroup,
    /// `minCredits` exceeds `maxCredits`.
    InvalidCreditBounds,
    /// A course lists itself as a prerequisite.
    SelfPrerequisite,
    /// Prerequisite graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a requirement set.
///
/// Checks:
/// 1. No duplicate required course codes
/// 2. No duplicate options within a group
/// 3. Every group has `0 < count <= options`
/// 4. `minCredits <= maxCredits` when both are set
/// 5. No course is its own prerequisite
/// 6. No circular prerequisite dependencies
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_requirements(requirements: &RequirementSet) -> ValidationResult {
    let mut errors = Vec::new();

    let mut required = BTreeSet::new();
    for code in &requirements.required {
        if !required.insert(code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCourse,
                format!("Duplicate required course: {code}"),
            ));
        }
    }

    for (_, group) in requirements.groups() {
        let mut options = BTreeSet::new();
        for code in &group.options {
            if !options.insert(code.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateCourse,
                    format!("Group '{}' lists {code} twice", group.label),
                ));
            }
        }

        if group.count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidGroup,
                format!("Group '{}' requires zero courses", group.label),
            ));
        } else if group.count > options.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidGroup,
                format!(
                    "Group '{}' requires {} courses but offers {}",
                    group.label,
                    group.count,
                    options.len()
                ),
            ));
        }
    }

    if let (Some(min), Some(max)) = (requirements.min_credits, requirements.max_credits) {
        if min > max {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCreditBounds,
                format!("minCredits {min} exceeds maxCredits {max}"),
            ));
        }
    }

    for p in requirements
        .prereqs
        .iter()
        .chain(&requirements.multi_semester_prereqs)
    {
        if p.requires.iter().any(|r| *r == p.course) {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfPrerequisite,
                format!("Course '{}' lists itself as a prerequisite", p.course),
            ));
        }
    }

    // Self edges are reported above; leave them out of the cycle search.
    let mut acyclic = requirements.clone();
    for p in acyclic
        .prereqs
        .iter_mut()
        .chain(acyclic.multi_semester_prereqs.iter_mut())
    {
        let course = p.course.clone();
        p.requires.retain(|r| *r != course);
    }
    if let Some(stuck) = PrerequisiteGraph::from_requirements(&acyclic).find_cycle() {
        errors.push(ValidationError::new(
            ValidationErrorKind::CyclicDependency,
            format!(
                "Circular prerequisite dependency involving {}",
                stuck.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChooseFrom, Prereq};

    fn sample_requirements() -> RequirementSet {
        RequirementSet::new()
            .with_required("CS0445")
            .with_required("CS1501")
            .with_choose_from(ChooseFrom::new(
                "Upper Level CS Electives",
                2,
                &["CS1621", "CS1653", "CS1674"],
            ))
            .with_gen_ed(ChooseFrom::new("Writing", 1, &["ENGCMP0200", "ENGCMP0400"]))
            .with_credit_bounds(12, 18)
            .with_multi_semester_prereq(Prereq::new("CS1501", &["CS0445"]))
    }

    #[test]
    fn test_valid_requirements() {
        assert!(validate_requirements(&sample_requirements()).is_ok());
        assert!(validate_requirements(&RequirementSet::new()).is_ok());
    }

    #[test]
    fn test_duplicate_required() {
        let reqs = sample_requirements().with_required("CS0445");
        let errors = validate_requirements(&reqs).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateCourse));
    }

    #[test]
    fn test_invalid_group_counts() {
        let reqs = RequirementSet::new()
            .with_choose_from(ChooseFrom::new("Empty", 0, &["CS1621"]))
            .with_choose_from(ChooseFrom::new("Greedy", 3, &["CS1621", "CS1653"]));
        let errors = validate_requirements(&reqs).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidGroup)
                .count(),
            2
        );
    }

    #[test]
    fn test_duplicate_options_shrink_group() {
        // Two distinct options for a count of 2 after collapsing duplicates
        let reqs = RequirementSet::new().with_choose_from(ChooseFrom::new(
            "Dup",
            2,
            &["CS1621", "CS1621"],
        ));
        let errors = validate_requirements(&reqs).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateCourse));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidGroup));
    }

    #[test]
    fn test_inverted_credit_bounds() {
        let reqs = sample_requirements().with_credit_bounds(18, 12);
        let errors = validate_requirements(&reqs).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidCreditBounds));
    }

    #[test]
    fn test_self_prerequisite() {
        let reqs = sample_requirements().with_prereq(Prereq::new("CS0445", &["CS0445"]));
        let errors = validate_requirements(&reqs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::SelfPrerequisite);
    }

    #[test]
    fn test_cyclic_dependency() {
        // CS0445 → CS1501 → CS0445 across both edge families
        let reqs = sample_requirements().with_prereq(Prereq::new("CS0445", &["CS1501"]));
        let errors = validate_requirements(&reqs).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency
                && e.message.contains("CS0445")));
    }

    #[test]
    fn test_multiple_errors() {
        let reqs = sample_requirements()
            .with_required("CS1501")
            .with_credit_bounds(20, 10);
        let errors = validate_requirements(&reqs).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
