//! Ordered multi-rule comparison for group candidates.
//!
//! Rules are applied in sequence; a later rule only decides ties left by
//! the earlier ones. Lexicographic course code is always the last step, so
//! the ordering is total and selection is deterministic.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, CandidateCourse, SelectionContext, SelectionRule};

/// Named ordering step, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCriterion {
    /// Courses whose prerequisites are completed.
    PrerequisitesSatisfied,
    /// Courses whose credits best fit the remaining budget.
    CreditFit,
    /// Lexicographic course code.
    CourseCode,
}

#[derive(Clone)]
enum Step {
    Rule(Arc<dyn SelectionRule>),
    ByCode,
}

/// A composable candidate ordering.
///
/// # Example
/// ```
/// use u_course_schedule::planner::{SelectionCriterion, SelectionPolicy};
///
/// let policy = SelectionPolicy::from_criteria(&[
///     SelectionCriterion::CreditFit,
///     SelectionCriterion::PrerequisitesSatisfied,
/// ]);
/// assert_eq!(policy.rule_names(), vec!["CREDIT_FIT", "PREREQ", "CODE"]);
/// ```
#[derive(Clone)]
pub struct SelectionPolicy {
    steps: Vec<Step>,
    epsilon: f64,
}

impl SelectionPolicy {
    /// Creates a policy that only orders by course code.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Builds a policy from configured criteria.
    pub fn from_criteria(criteria: &[SelectionCriterion]) -> Self {
        criteria.iter().fold(Self::new(), |policy, c| match c {
            SelectionCriterion::PrerequisitesSatisfied => {
                policy.with_rule(rules::PrerequisitesSatisfied)
            }
            SelectionCriterion::CreditFit => policy.with_rule(rules::CreditFit),
            SelectionCriterion::CourseCode => policy.with_code_order(),
        })
    }

    /// Appends a rule.
    pub fn with_rule<R: SelectionRule + 'static>(mut self, rule: R) -> Self {
        self.steps.push(Step::Rule(Arc::new(rule)));
        self
    }

    /// Appends the course-code step.
    pub fn with_code_order(mut self) -> Self {
        self.steps.push(Step::ByCode);
        self
    }

    /// Step names in evaluation order, including the implicit final code step.
    pub fn rule_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .steps
            .iter()
            .map(|s| match s {
                Step::Rule(r) => r.name(),
                Step::ByCode => "CODE",
            })
            .collect();
        if !self.has_code_step() {
            names.push("CODE");
        }
        names
    }

    fn has_code_step(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::ByCode))
    }

    /// Compares two candidates; `Less` means `a` is preferred.
    pub fn compare(
        &self,
        a: &CandidateCourse,
        b: &CandidateCourse,
        context: &SelectionContext,
    ) -> Ordering {
        for step in &self.steps {
            let ord = match step {
                Step::Rule(rule) => {
                    let score_a = rule.evaluate(a, context);
                    let score_b = rule.evaluate(b, context);
                    if (score_a - score_b).abs() > self.epsilon {
                        score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal)
                    } else {
                        Ordering::Equal
                    }
                }
                Step::ByCode => a.code.cmp(&b.code),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.code.cmp(&b.code)
    }

    /// Sorts candidates, most preferred first.
    pub fn sort(&self, candidates: &mut [CandidateCourse], context: &SelectionContext) {
        candidates.sort_by(|a, b| self.compare(a, b, context));
    }

    /// Index of the most preferred candidate.
    pub fn select_best(
        &self,
        candidates: &[CandidateCourse],
        context: &SelectionContext,
    ) -> Option<usize> {
        (0..candidates.len()).min_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context))
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionPolicy")
            .field("steps", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<CandidateCourse> {
        vec![
            CandidateCourse::new("CS1699", 3).satisfied(),
            CandidateCourse::new("CS1653", 4),
            CandidateCourse::new("CS1621", 1),
            CandidateCourse::new("CS1674", 3).satisfied(),
        ]
    }

    fn codes(c: &[CandidateCourse]) -> Vec<&str> {
        c.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn test_default_order() {
        let policy = SelectionPolicy::from_criteria(&[
            SelectionCriterion::PrerequisitesSatisfied,
            SelectionCriterion::CreditFit,
            SelectionCriterion::CourseCode,
        ]);
        let mut c = candidates();
        policy.sort(&mut c, &SelectionContext::new(6, 2));
        assert_eq!(codes(&c), vec!["CS1674", "CS1699", "CS1653", "CS1621"]);
    }

    #[test]
    fn test_reordered_criteria() {
        // Credit fit first: 4 credits over 1 slot favours the 4-credit course
        let policy = SelectionPolicy::from_criteria(&[
            SelectionCriterion::CreditFit,
            SelectionCriterion::PrerequisitesSatisfied,
        ]);
        let ctx = SelectionContext::new(4, 1);
        let c = candidates();
        assert_eq!(c[policy.select_best(&c, &ctx).unwrap()].code, "CS1653");
    }

    #[test]
    fn test_code_is_final_tie_break() {
        let policy = SelectionPolicy::new();
        let mut c = candidates();
        policy.sort(&mut c, &SelectionContext::default());
        assert_eq!(codes(&c), vec!["CS1621", "CS1653", "CS1674", "CS1699"]);
        assert_eq!(policy.rule_names(), vec!["CODE"]);
    }

    #[test]
    fn test_empty_candidates() {
        let policy = SelectionPolicy::new().with_rule(rules::CreditFit);
        assert!(policy.select_best(&[], &SelectionContext::default()).is_none());
    }

    #[test]
    fn test_criterion_serde() {
        let c: SelectionCriterion = serde_json::from_str("\"prerequisites_satisfied\"").unwrap();
        assert_eq!(c, SelectionCriterion::PrerequisitesSatisfied);
    }
}
