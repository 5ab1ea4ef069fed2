//! Requirement-driven course selection.
//!
//! # Algorithm
//! 1. Pinned courses are always selected.
//! 2. Required courses follow in listed order, minus skipped, completed,
//!    unavailable, and prerequisite-blocked ones.
//! 3. Each group (general education first, then electives) is filled up to
//!    its count, one pick at a time with the [`SelectionPolicy`]. Options
//!    already selected or completed count toward the group, so a pinned
//!    group member always takes one of its slots before any other pick.
//!    Options passed over by an earlier placement attempt are not eligible.
//! 4. Same-term prerequisites are checked to a fixed point against the
//!    selection; stranded courses are dropped.
//! 5. A credit shortfall below the minimum is reported.
//!
//! Nothing here fails: every exclusion becomes an [`Issue`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use super::{CandidateCourse, SelectionContext, SelectionPolicy};
use crate::config::SolverConfig;
use crate::constraint_model::ConstraintModel;
use crate::models::{ChooseFrom, Course, Issue, IssueKind};

/// Requirement category a selected course satisfies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Required,
    /// Member of the named choose-from group.
    Group(String),
    /// Selected only because the user pinned it.
    Pinned,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Required => f.write_str("required course"),
            Category::Group(label) => write!(f, "{label}"),
            Category::Pinned => f.write_str("pinned by request"),
        }
    }
}

/// A course chosen for the term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedCourse {
    pub code: String,
    pub credits: u32,
    pub category: Category,
}

/// Planner output: the ordered course list plus every exclusion notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSelection {
    pub courses: Vec<SelectedCourse>,
    pub issues: Vec<Issue>,
}

impl CourseSelection {
    /// Sum of selected credits.
    pub fn total_credits(&self) -> u32 {
        self.courses.iter().map(|c| c.credits).sum()
    }

    /// Selected course codes.
    pub fn codes(&self) -> BTreeSet<String> {
        self.courses.iter().map(|c| c.code.clone()).collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.courses.iter().any(|c| c.code == code)
    }

    pub fn category_of(&self, code: &str) -> Option<&Category> {
        self.courses
            .iter()
            .find(|c| c.code == code)
            .map(|c| &c.category)
    }

    fn push(&mut self, code: &str, credits: u32, category: Category) {
        self.courses.push(SelectedCourse {
            code: code.to_string(),
            credits,
            category,
        });
    }
}

/// Chooses which courses to schedule.
#[derive(Debug, Clone)]
pub struct CourseSelectionPlanner {
    policy: SelectionPolicy,
}

impl CourseSelectionPlanner {
    /// Creates a planner with an explicit group ordering.
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Creates a planner using the configured selection order.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(SelectionPolicy::from_criteria(&config.selection_order))
    }

    /// Selects courses.
    ///
    /// `offered` holds the courses with at least one section this term.
    pub fn plan(&self, model: &ConstraintModel, offered: &BTreeMap<String, Course>) -> CourseSelection {
        self.plan_excluding(model, offered, &BTreeSet::new())
    }

    /// Selects courses without picking any of `passed_over` for a group.
    ///
    /// Used to refill a group after its chosen member could not be placed.
    pub fn plan_excluding(
        &self,
        model: &ConstraintModel,
        offered: &BTreeMap<String, Course>,
        passed_over: &BTreeSet<String>,
    ) -> CourseSelection {
        let mut run = PlanRun {
            model,
            offered,
            passed_over,
            max_courses: model.max_courses.unwrap_or(usize::MAX),
            selection: CourseSelection::default(),
        };

        run.select_pins();
        run.select_required();
        for (_, group) in model.requirements.groups() {
            run.fill_group(group, &self.policy);
        }
        run.drop_stranded();
        run.check_minimum();

        debug!(
            courses = run.selection.courses.len(),
            credits = run.selection.total_credits(),
            issues = run.selection.issues.len(),
            "course selection complete"
        );
        run.selection
    }
}

impl Default for CourseSelectionPlanner {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

struct PlanRun<'a> {
    model: &'a ConstraintModel,
    offered: &'a BTreeMap<String, Course>,
    passed_over: &'a BTreeSet<String>,
    max_courses: usize,
    selection: CourseSelection,
}

impl PlanRun<'_> {
    fn total(&self) -> u32 {
        self.selection.total_credits()
    }

    fn fits(&self, credits: u32) -> bool {
        self.selection.courses.len() < self.max_courses
            && self.total() + credits <= self.model.credits.max
    }

    fn category_for(&self, code: &str) -> Category {
        if self.model.requirements.is_required(code) {
            Category::Required
        } else if let Some(label) = self.model.requirements.group_of(code) {
            Category::Group(label.to_string())
        } else {
            Category::Pinned
        }
    }

    fn select_pins(&mut self) {
        let model = self.model;
        for code in model.pins.keys() {
            let Some(course) = self.offered.get(code) else {
                self.selection.issues.push(Issue::course(
                    IssueKind::PinInvalidated,
                    code.as_str(),
                    format!("Pinned course {code} has no sections offered this term"),
                ));
                continue;
            };
            let missing = model.graph.missing_prior(code, &model.completed);
            if !missing.is_empty() {
                self.selection.issues.push(Issue::course(
                    IssueKind::PrerequisiteUnmet,
                    code.as_str(),
                    format!(
                        "Pinned course {code} kept although {} must be completed first",
                        missing.join(", ")
                    ),
                ));
            }
            let category = self.category_for(code);
            self.selection.push(code, course.credits, category);
        }
    }

    fn select_required(&mut self) {
        let model = self.model;
        for code in &model.requirements.required {
            if self.selection.contains(code) || model.completed.contains(code) {
                continue;
            }
            if model.is_skipped(code) {
                self.selection.issues.push(Issue::course(
                    IssueKind::RequirementUnmet,
                    code.as_str(),
                    format!("Required course {code} skipped by request"),
                ));
                continue;
            }
            let missing = model.graph.missing_prior(code, &model.completed);
            if !missing.is_empty() {
                self.selection.issues.push(Issue::course(
                    IssueKind::PrerequisiteUnmet,
                    code.as_str(),
                    format!(
                        "{code} requires {} completed in an earlier term",
                        missing.join(", ")
                    ),
                ));
                continue;
            }
            let Some(course) = self.offered.get(code) else {
                self.selection.issues.push(Issue::course(
                    IssueKind::DataUnavailable,
                    code.as_str(),
                    format!("No sections of required course {code} are offered this term"),
                ));
                continue;
            };
            if !self.fits(course.credits) {
                self.selection.issues.push(Issue::course(
                    IssueKind::RequirementUnmet,
                    code.as_str(),
                    format!(
                        "Required course {code} deferred: adding {} credits would exceed the {}-credit maximum",
                        course.credits, model.credits.max
                    ),
                ));
                continue;
            }
            self.selection.push(code, course.credits, Category::Required);
        }
    }

    fn fill_group(&mut self, group: &ChooseFrom, policy: &SelectionPolicy) {
        let model = self.model;
        let counted = group
            .options
            .iter()
            .filter(|o| self.selection.contains(o) || model.completed.contains(*o))
            .count();
        let mut need = group.count.saturating_sub(counted);
        if need == 0 {
            return;
        }

        let mut candidates: Vec<CandidateCourse> = group
            .options
            .iter()
            .filter(|o| {
                !self.selection.contains(o)
                    && !model.completed.contains(*o)
                    && !model.is_skipped(o)
                    && !self.passed_over.contains(*o)
                    && model.graph.missing_prior(o, &model.completed).is_empty()
            })
            .filter_map(|o| self.offered.get(o))
            .map(|course| CandidateCourse {
                code: course.code.clone(),
                credits: course.credits,
                prerequisites_satisfied: model.graph.is_satisfied_by(&course.code, &model.completed),
            })
            .collect();

        while need > 0 {
            candidates.retain(|c| self.fits(c.credits));
            let context = SelectionContext::new(
                model.credits.max.saturating_sub(self.total()),
                need,
            );
            let Some(best) = policy.select_best(&candidates, &context) else {
                break;
            };
            let pick = candidates.swap_remove(best);
            debug!(group = %group.label, course = %pick.code, "group member selected");
            self.selection
                .push(&pick.code, pick.credits, Category::Group(group.label.clone()));
            need -= 1;
        }

        if need > 0 {
            self.selection.issues.push(Issue::general(
                IssueKind::RequirementUnmet,
                format!(
                    "{} needs {need} more course(s); no eligible offered option fits",
                    group.label
                ),
            ));
        }
    }

    fn drop_stranded(&mut self) {
        let model = self.model;
        let stranded = model
            .graph
            .unsatisfied_concurrent(&self.selection.codes(), &model.completed);
        for (code, missing) in stranded {
            if model.pins.contains_key(&code) {
                continue;
            }
            self.selection.courses.retain(|c| c.code != code);
            self.selection.issues.push(Issue::course(
                IssueKind::PrerequisiteUnmet,
                code.as_str(),
                format!(
                    "{code} dropped: requires {} completed or taken this term",
                    missing.join(", ")
                ),
            ));
        }
    }

    fn check_minimum(&mut self) {
        let total = self.total();
        let bounds = self.model.credits;
        if total < bounds.min {
            self.selection.issues.push(Issue::general(
                IssueKind::Infeasible,
                format!(
                    "Selected courses total {total} credits, {} short of the {}-credit minimum",
                    bounds.min - total,
                    bounds.min
                ),
            ));
        } else if total > bounds.max {
            self.selection.issues.push(Issue::general(
                IssueKind::Infeasible,
                format!(
                    "Pinned courses total {total} credits, above the {}-credit maximum",
                    bounds.max
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraints, CreditTarget, Prereq, RequirementSet};

    fn offered(courses: &[(&str, u32)]) -> BTreeMap<String, Course> {
        courses
            .iter()
            .map(|(c, cr)| (c.to_string(), Course::new(*c, *cr)))
            .collect()
    }

    fn catalog() -> BTreeMap<String, Course> {
        offered(&[
            ("CS0445", 4),
            ("CS1501", 3),
            ("CS1550", 3),
            ("CS1621", 3),
            ("CS1653", 3),
            ("CS1674", 3),
            ("ENGCMP0200", 3),
            ("ENGCMP0400", 3),
        ])
    }

    fn requirements() -> RequirementSet {
        RequirementSet::new()
            .with_required("CS0445")
            .with_required("CS1501")
            .with_gen_ed(ChooseFrom::new("Writing", 1, &["ENGCMP0400", "ENGCMP0200"]))
            .with_choose_from(ChooseFrom::new(
                "Upper Level CS Electives",
                2,
                &["CS1674", "CS1653", "CS1621"],
            ))
            .with_credit_bounds(12, 18)
    }

    fn plan(reqs: &RequirementSet, c: &Constraints) -> CourseSelection {
        let model = ConstraintModel::build(reqs, c, &SolverConfig::default());
        CourseSelectionPlanner::default().plan(&model, &catalog())
    }

    fn codes(s: &CourseSelection) -> Vec<&str> {
        s.courses.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn test_basic_selection() {
        let s = plan(&requirements(), &Constraints::new());
        assert_eq!(
            codes(&s),
            vec!["CS0445", "CS1501", "ENGCMP0200", "CS1621", "CS1653"]
        );
        assert_eq!(s.total_credits(), 16);
        assert!(s.issues.is_empty());
        assert_eq!(s.category_of("CS0445"), Some(&Category::Required));
        assert_eq!(
            s.category_of("CS1621"),
            Some(&Category::Group("Upper Level CS Electives".into()))
        );
    }

    #[test]
    fn test_skip_required_reported() {
        let s = plan(&requirements(), &Constraints::new().skip("CS1501"));
        assert!(!s.contains("CS1501"));
        assert_eq!(s.issues[0].kind, IssueKind::RequirementUnmet);
        assert_eq!(s.issues[0].course.as_deref(), Some("CS1501"));
    }

    #[test]
    fn test_pinned_group_member_preferred() {
        let s = plan(&requirements(), &Constraints::new().pin("CS1674", "99999"));
        assert_eq!(codes(&s)[0], "CS1674");
        // Pin counts toward the group; one more elective is added
        let electives: Vec<_> = s
            .courses
            .iter()
            .filter(|c| matches!(&c.category, Category::Group(l) if l.starts_with("Upper")))
            .collect();
        assert_eq!(electives.len(), 2);
    }

    #[test]
    fn test_multi_semester_prereq_excluded() {
        let reqs = requirements().with_multi_semester_prereq(Prereq::new("CS1501", &["CS0445"]));
        let s = plan(&reqs, &Constraints::new());
        assert!(!s.contains("CS1501"));
        assert!(s
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::PrerequisiteUnmet && i.message.contains("CS0445")));

        let s = plan(&reqs, &Constraints::new().complete("CS0445"));
        assert!(s.contains("CS1501"));
        // Completed courses are not retaken
        assert!(!s.contains("CS0445"));
    }

    #[test]
    fn test_unavailable_required() {
        let reqs = requirements().with_required("CS1502");
        let s = plan(&reqs, &Constraints::new());
        assert!(s
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::DataUnavailable && i.course.as_deref() == Some("CS1502")));
    }

    #[test]
    fn test_max_credits_respected() {
        let c = Constraints::new().with_target(CreditTarget::range(6, 10));
        let s = plan(&requirements(), &c);
        assert!(s.total_credits() <= 10);
        assert_eq!(codes(&s), vec!["CS0445", "CS1501", "ENGCMP0200"]);
        assert!(s
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::RequirementUnmet && i.message.contains("Upper Level")));
    }

    #[test]
    fn test_minimum_shortfall() {
        let reqs = RequirementSet::new()
            .with_required("CS0445")
            .with_credit_bounds(12, 18);
        let s = plan(&reqs, &Constraints::new());
        assert_eq!(s.total_credits(), 4);
        let infeasible = s
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::Infeasible)
            .unwrap();
        assert!(infeasible.message.contains("8 short"));
    }

    #[test]
    fn test_concurrent_prereq_dropped() {
        let reqs = RequirementSet::new()
            .with_required("CS1550")
            .with_prereq(Prereq::new("CS1550", &["CS0449"]))
            .with_credit_bounds(0, 18);
        let s = plan(&reqs, &Constraints::new());
        assert!(s.courses.is_empty());
        assert_eq!(s.issues[0].kind, IssueKind::PrerequisiteUnmet);

        // Taken concurrently
        let reqs = RequirementSet::new()
            .with_required("CS0445")
            .with_required("CS1550")
            .with_prereq(Prereq::new("CS1550", &["CS0445"]))
            .with_credit_bounds(0, 18);
        let s = plan(&reqs, &Constraints::new());
        assert!(s.contains("CS1550"));
    }

    #[test]
    fn test_pin_without_sections() {
        let s = plan(&requirements(), &Constraints::new().pin("HIST0100", "1"));
        assert!(!s.contains("HIST0100"));
        assert_eq!(s.issues[0].kind, IssueKind::PinInvalidated);
    }

    #[test]
    fn test_passed_over_option_replaced() {
        let reqs = RequirementSet::new()
            .with_required("CS0445")
            .with_choose_from(ChooseFrom::new("Electives", 1, &["CS1501", "CS1550"]))
            .with_credit_bounds(7, 18);
        let model = ConstraintModel::build(&reqs, &Constraints::new(), &SolverConfig::default());
        let planner = CourseSelectionPlanner::default();

        assert_eq!(codes(&planner.plan(&model, &catalog())), vec!["CS0445", "CS1501"]);

        let passed_over = BTreeSet::from(["CS1501".to_string()]);
        let s = planner.plan_excluding(&model, &catalog(), &passed_over);
        assert_eq!(codes(&s), vec!["CS0445", "CS1550"]);
        assert_eq!(s.total_credits(), 7);

        // Nothing left to pick once every option is passed over
        let passed_over = BTreeSet::from(["CS1501".to_string(), "CS1550".to_string()]);
        let s = planner.plan_excluding(&model, &catalog(), &passed_over);
        assert_eq!(codes(&s), vec!["CS0445"]);
        assert!(s.issues.iter().any(|i| i.kind == IssueKind::RequirementUnmet));
    }

    #[test]
    fn test_max_courses_cap() {
        let config = SolverConfig {
            max_courses: Some(3),
            ..SolverConfig::default()
        };
        let model = ConstraintModel::build(&requirements(), &Constraints::new(), &config);
        let s = CourseSelectionPlanner::from_config(&config).plan(&model, &catalog());
        assert_eq!(s.courses.len(), 3);
    }
}
