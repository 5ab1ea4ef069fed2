//! Built-in selection rules.
//!
//! All rules return lower scores for higher priority candidates.

use super::{CandidateCourse, RuleScore, SelectionContext, SelectionRule};

/// Courses whose prerequisites are already completed come first.
#[derive(Debug, Clone, Copy)]
pub struct PrerequisitesSatisfied;

impl SelectionRule for PrerequisitesSatisfied {
    fn name(&self) -> &'static str {
        "PREREQ"
    }

    fn evaluate(&self, candidate: &CandidateCourse, _context: &SelectionContext) -> RuleScore {
        if candidate.prerequisites_satisfied {
            0.0
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "Prerequisites already satisfied"
    }
}

/// Credit Fit.
///
/// Distance between a course's credits and the even share of the remaining
/// credit budget across the slots the group still needs.
#[derive(Debug, Clone, Copy)]
pub struct CreditFit;

impl SelectionRule for CreditFit {
    fn name(&self) -> &'static str {
        "CREDIT_FIT"
    }

    fn evaluate(&self, candidate: &CandidateCourse, context: &SelectionContext) -> RuleScore {
        (candidate.credits as f64 - context.credits_per_slot()).abs()
    }

    fn description(&self) -> &'static str {
        "Lowest credit variance from the remaining budget"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerequisites_satisfied() {
        let ctx = SelectionContext::new(6, 2);
        let a = CandidateCourse::new("CS1621", 3).satisfied();
        let b = CandidateCourse::new("CS1653", 3);
        assert!(
            PrerequisitesSatisfied.evaluate(&a, &ctx) < PrerequisitesSatisfied.evaluate(&b, &ctx)
        );
    }

    #[test]
    fn test_credit_fit() {
        // 7 credits over 2 slots → 3.5 per slot
        let ctx = SelectionContext::new(7, 2);
        let three = CandidateCourse::new("A", 3);
        let four = CandidateCourse::new("B", 4);
        let one = CandidateCourse::new("C", 1);
        assert!((CreditFit.evaluate(&three, &ctx) - 0.5).abs() < 1e-10);
        assert!((CreditFit.evaluate(&four, &ctx) - 0.5).abs() < 1e-10);
        assert!(CreditFit.evaluate(&one, &ctx) > CreditFit.evaluate(&three, &ctx));
    }

    #[test]
    fn test_credit_fit_no_slots() {
        let ctx = SelectionContext::new(4, 0);
        assert!(CreditFit.evaluate(&CandidateCourse::new("A", 4), &ctx).abs() < 1e-10);
    }
}
