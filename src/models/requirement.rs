//! Degree requirement model.
//!
//! A requirement set lists the courses a student must take, groups from
//! which N courses must be chosen (electives and general education), the
//! per-term credit bounds, and the prerequisite edges between courses.
//!
//! Field names are stable across the service boundary (`required`,
//! `genEds`, `chooseFrom`, `minCredits`, `maxCredits`, `prereqs`,
//! `multiSemesterPrereqs`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::normalize_course_code;

/// A "choose N of these" requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseFrom {
    /// Group label (e.g., `Writing Intensive`).
    pub label: String,
    /// Number of distinct courses required.
    pub count: usize,
    /// Eligible course codes.
    pub options: Vec<String>,
}

impl ChooseFrom {
    /// Creates a group.
    pub fn new(label: impl Into<String>, count: usize, options: &[&str]) -> Self {
        Self {
            label: label.into(),
            count,
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether `code` is an eligible option.
    pub fn contains(&self, code: &str) -> bool {
        self.options.iter().any(|o| o == code)
    }
}

/// A prerequisite edge list: `course` requires every code in `requires`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prereq {
    pub course: String,
    pub requires: Vec<String>,
}

impl Prereq {
    /// Creates an edge list.
    pub fn new(course: impl Into<String>, requires: &[&str]) -> Self {
        Self {
            course: course.into(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Kind of choose-from group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// General education.
    GenEd,
    /// Major elective.
    Elective,
}

/// Degree requirements for one school/major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_year: Option<String>,
    /// Courses that must be taken.
    pub required: Vec<String>,
    /// General education groups.
    pub gen_eds: Vec<ChooseFrom>,
    /// Major elective groups.
    pub choose_from: Vec<ChooseFrom>,
    pub min_credits: Option<u32>,
    pub max_credits: Option<u32>,
    /// Prerequisites satisfiable by completion or concurrent enrollment.
    pub prereqs: Vec<Prereq>,
    /// Prerequisites that must be completed in an earlier term.
    pub multi_semester_prereqs: Vec<Prereq>,
}

impl RequirementSet {
    /// Creates an empty requirement set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required course.
    pub fn with_required(mut self, code: impl Into<String>) -> Self {
        self.required.push(code.into());
        self
    }

    /// Adds a general education group.
    pub fn with_gen_ed(mut self, group: ChooseFrom) -> Self {
        self.gen_eds.push(group);
        self
    }

    /// Adds a major elective group.
    pub fn with_choose_from(mut self, group: ChooseFrom) -> Self {
        self.choose_from.push(group);
        self
    }

    /// Sets the credit bounds.
    pub fn with_credit_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_credits = Some(min);
        self.max_credits = Some(max);
        self
    }

    /// Adds a same-term prerequisite edge list.
    pub fn with_prereq(mut self, prereq: Prereq) -> Self {
        self.prereqs.push(prereq);
        self
    }

    /// Adds a multi-term prerequisite edge list.
    pub fn with_multi_semester_prereq(mut self, prereq: Prereq) -> Self {
        self.multi_semester_prereqs.push(prereq);
        self
    }

    /// All choose-from groups: general education first, then electives.
    pub fn groups(&self) -> impl Iterator<Item = (GroupKind, &ChooseFrom)> {
        self.gen_eds
            .iter()
            .map(|g| (GroupKind::GenEd, g))
            .chain(self.choose_from.iter().map(|g| (GroupKind::Elective, g)))
    }

    /// Every course code mentioned as required or as a group option.
    pub fn candidate_codes(&self) -> BTreeSet<String> {
        self.required
            .iter()
            .chain(self.groups().flat_map(|(_, g)| g.options.iter()))
            .cloned()
            .collect()
    }

    /// Whether `code` is a required course.
    pub fn is_required(&self, code: &str) -> bool {
        self.required.iter().any(|c| c == code)
    }

    /// Label of the first group listing `code`.
    pub fn group_of(&self, code: &str) -> Option<&str> {
        self.groups()
            .find(|(_, g)| g.contains(code))
            .map(|(_, g)| g.label.as_str())
    }

    /// Returns a copy with every course code normalized.
    ///
    /// Codes that fail normalization are dropped; duplicate required codes
    /// and duplicate group options collapse to their first occurrence.
    pub fn normalized(&self) -> Self {
        Self {
            catalog_year: self.catalog_year.clone(),
            required: normalize_list(&self.required),
            gen_eds: self.gen_eds.iter().map(normalize_group).collect(),
            choose_from: self.choose_from.iter().map(normalize_group).collect(),
            min_credits: self.min_credits,
            max_credits: self.max_credits,
            prereqs: self.prereqs.iter().filter_map(normalize_prereq).collect(),
            multi_semester_prereqs: self
                .multi_semester_prereqs
                .iter()
                .filter_map(normalize_prereq)
                .collect(),
        }
    }
}

fn normalize_list(codes: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    codes
        .iter()
        .filter_map(|c| normalize_course_code(c))
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

fn normalize_group(group: &ChooseFrom) -> ChooseFrom {
    ChooseFrom {
        label: group.label.clone(),
        count: group.count,
        options: normalize_list(&group.options),
    }
}

fn normalize_prereq(prereq: &Prereq) -> Option<Prereq> {
    Some(Prereq {
        course: normalize_course_code(&prereq.course)?,
        requires: normalize_list(&prereq.requires),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RequirementSet {
        RequirementSet::new()
            .with_required("CS0445")
            .with_required("CS1501")
            .with_gen_ed(ChooseFrom::new("History", 1, &["HIST0100", "HIST0600"]))
            .with_choose_from(ChooseFrom::new("CS Electives", 2, &["CS1621", "CS1653", "CS1674"]))
            .with_credit_bounds(12, 18)
            .with_multi_semester_prereq(Prereq::new("CS1621", &["CS0445"]))
    }

    #[test]
    fn test_candidate_codes() {
        let codes = sample().candidate_codes();
        assert_eq!(codes.len(), 7);
        assert!(codes.contains("HIST0600"));
    }

    #[test]
    fn test_groups_order() {
        let reqs = sample();
        let kinds: Vec<GroupKind> = reqs.groups().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![GroupKind::GenEd, GroupKind::Elective]);
        assert_eq!(reqs.group_of("CS1653"), Some("CS Electives"));
        assert_eq!(reqs.group_of("CS0445"), None);
        assert!(reqs.is_required("CS0445"));
    }

    #[test]
    fn test_normalized() {
        let reqs = RequirementSet::new()
            .with_required("cs 0445")
            .with_required("CS0445")
            .with_required("??")
            .with_prereq(Prereq::new("cs1501", &["cs 0445"]));
        let n = reqs.normalized();
        assert_eq!(n.required, vec!["CS0445".to_string()]);
        assert_eq!(n.prereqs[0].course, "CS1501");
        assert_eq!(n.prereqs[0].requires, vec!["CS0445".to_string()]);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        for key in [
            "required",
            "genEds",
            "chooseFrom",
            "minCredits",
            "maxCredits",
            "prereqs",
            "multiSemesterPrereqs",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }

        let back: RequirementSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_deserialize_sparse() {
        let reqs: RequirementSet = serde_json::from_str(r#"{"required": ["CS0401"]}"#).unwrap();
        assert_eq!(reqs.required.len(), 1);
        assert!(reqs.gen_eds.is_empty());
        assert_eq!(reqs.min_credits, None);
    }
}
