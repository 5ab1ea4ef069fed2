//! Plan explanations and alternatives.
//!
//! Explanation strings come in a fixed order:
//! 1. pinned-course confirmations
//! 2. placed courses with the requirement and preferences they satisfy
//! 3. relaxed-preference notices
//! 4. unmet requirements, invalidated pins, unassignable courses, and any
//!    credit shortfall
//!
//! Alternatives list, per placed course, up to K conflict-free sections that
//! were not chosen, in the scheduler's tie-break order.

use crate::constraint_model::ConstraintModel;
use crate::models::{Alternative, Issue, IssueKind, Section};
use crate::planner::CourseSelection;
use crate::scheduler::{spread_with, Placement, Relaxed, ScheduleOutcome};

/// Explainer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explanation {
    pub explanations: Vec<String>,
    pub alternatives: Vec<Alternative>,
    /// Relaxations first, then unmet constraints, matching the explanation
    /// order.
    pub issues: Vec<Issue>,
}

/// Builds explanations from planner and scheduler output.
#[derive(Debug, Clone)]
pub struct Explainer {
    max_alternatives: usize,
}

impl Explainer {
    pub fn new(max_alternatives: usize) -> Self {
        Self { max_alternatives }
    }

    pub fn explain(
        &self,
        model: &ConstraintModel,
        selection: &CourseSelection,
        outcome: &ScheduleOutcome,
    ) -> Explanation {
        let mut explanations = Vec::new();

        for p in outcome.placements.iter().filter(|p| p.pinned) {
            explanations.push(format!(
                "Pinned {}: {}",
                p.section.describe(),
                p.section.schedule_summary()
            ));
        }

        for p in outcome.placements.iter().filter(|p| !p.pinned) {
            let category = selection
                .category_of(p.course())
                .map(|c| c.to_string())
                .unwrap_or_else(|| "selected course".to_string());
            explanations.push(format!(
                "Placed {} for {category}: {}; {}",
                p.section.describe(),
                p.section.schedule_summary(),
                satisfied(model, p)
            ));
        }

        let (mut relaxed, mut unmet): (Vec<Issue>, Vec<Issue>) = model
            .notes
            .iter()
            .chain(&selection.issues)
            .chain(&outcome.issues)
            .cloned()
            .partition(|i| i.kind == IssueKind::ConstraintRelaxed);

        let total = outcome.total_credits();
        let bounds = model.credits;
        if total < bounds.min && selection.total_credits() >= bounds.min {
            unmet.push(Issue::general(
                IssueKind::Infeasible,
                format!(
                    "Scheduled sections total {total} credits, {} short of the {}-credit minimum; no remaining option could be placed",
                    bounds.min - total,
                    bounds.min
                ),
            ));
        }

        explanations.extend(relaxed.iter().chain(&unmet).map(|i| i.message.clone()));
        relaxed.append(&mut unmet);

        Explanation {
            explanations,
            alternatives: self.alternatives(outcome),
            issues: relaxed,
        }
    }

    /// Up to K unchosen, conflict-free sections per placed course.
    pub fn alternatives(&self, outcome: &ScheduleOutcome) -> Vec<Alternative> {
        if self.max_alternatives == 0 {
            return Vec::new();
        }
        let mut alternatives = Vec::new();
        for p in &outcome.placements {
            let others: Vec<&Section> = outcome
                .sections()
                .filter(|s| s.course != p.section.course)
                .collect();
            let Some(pool) = outcome.pools.get(p.course()) else {
                continue;
            };
            let mut ranked: Vec<(u32, &Section)> = pool
                .iter()
                .filter(|s| s.crn != p.section.crn)
                .filter(|s| !others.iter().any(|o| o.conflicts_with(s)))
                .map(|s| (spread_with(others.iter().copied(), s), s))
                .collect();
            ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.crn.cmp(&b.1.crn)));

            let sections: Vec<Section> = ranked
                .into_iter()
                .take(self.max_alternatives)
                .map(|(_, s)| s.clone())
                .collect();
            if !sections.is_empty() {
                alternatives.push(Alternative {
                    course: p.course().to_string(),
                    sections,
                });
            }
        }
        alternatives
    }
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Preferences a placed section honors.
fn satisfied(model: &ConstraintModel, p: &Placement) -> String {
    let mut parts = Vec::new();
    let days_kept = !matches!(p.relaxed, Some(Relaxed::Days | Relaxed::Both));
    let window_kept = !matches!(p.relaxed, Some(Relaxed::TimeWindow | Relaxed::Both));
    if !model.excluded_days.is_empty() && days_kept {
        parts.push(format!("avoids {}", model.describe_days()));
    }
    if let (Some(window), true) = (model.window, window_kept) {
        parts.push(format!("within {window}"));
    }
    parts.push("no time conflicts".to_string());
    parts.join(", ")
}
